pub mod aggregation;
pub mod metrics;

pub use aggregation::{canonicalize, PropertyAggregator, PropertyBucket, PropertyCanonicalizer};
pub use metrics::{FinancialMetricsEngine, FinancialSummary, MonthlyFigures, PropertyFinancialProfile};
