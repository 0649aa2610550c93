pub mod amortization;
pub mod capacity;
pub mod risk;

pub use amortization::{level_payment, max_loan_amount, AmortizationSchedule, ScheduledPayment};
pub use capacity::{InvestmentCapacity, InvestmentCapacityModel};
pub use risk::{classify_risk, recommend, Recommendation};
