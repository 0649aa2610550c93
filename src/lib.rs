pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod investment;
pub mod pipeline;
pub mod portfolio;
pub mod reconciliation;
pub mod records;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{AnalyticsConfig, InvestmentPolicy, RecommendationThresholds, RiskThresholds};
pub use decimal::{Money, Rate};
pub use errors::{AnalyticsError, Result};
pub use events::{Event, EventStore, ExclusionReason};
pub use investment::{
    AmortizationSchedule, InvestmentCapacity, InvestmentCapacityModel, Recommendation,
    ScheduledPayment,
};
pub use pipeline::{AnalyticsPipeline, AnalyticsReport};
pub use portfolio::{
    canonicalize, FinancialMetricsEngine, FinancialSummary, MonthlyFigures, PropertyAggregator,
    PropertyBucket, PropertyCanonicalizer, PropertyFinancialProfile,
};
pub use reconciliation::{
    parse_contract_amount, ContractMatcher, PaymentReconciler, ReconciliationOutcome,
    SettlementPolicy, TenantPropertyMatcher, ThresholdSettlement,
};
pub use records::{
    ChargeRecord, ContractRecord, PaymentRecord, PortfolioSnapshot, PropertyRecord, SkippedRecord,
};
pub use serialization::ReportView;
pub use types::{LeaseStatus, MonthKey, PaymentStatus, PaymentType, RiskLevel};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
