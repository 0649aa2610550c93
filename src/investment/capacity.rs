use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AnalyticsConfig, InvestmentPolicy, RecommendationThresholds, RiskThresholds};
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::investment::amortization::{max_loan_amount, AmortizationSchedule};
use crate::investment::risk::{classify_risk, recommend, Recommendation};
use crate::portfolio::FinancialSummary;
use crate::types::RiskLevel;

/// how much new debt and equity current profit can support
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentCapacity {
    pub available_for_investment: Money,
    pub monthly_budget_for_loan: Money,
    pub max_loan_amount: Money,
    pub recommended_down_payment: Money,
    pub max_property_price: Money,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<Recommendation>,
}

impl InvestmentCapacity {
    /// repayment schedule of the recommended loan
    pub fn financing_schedule(&self, policy: &InvestmentPolicy, start: NaiveDate) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(
            self.max_loan_amount,
            policy.annual_interest_rate,
            policy.term_months,
            start,
        )
    }
}

/// derives investment capacity from a portfolio summary
#[derive(Debug, Clone, Default)]
pub struct InvestmentCapacityModel {
    policy: InvestmentPolicy,
    risk: RiskThresholds,
    recommendations: RecommendationThresholds,
}

impl InvestmentCapacityModel {
    pub fn new(policy: InvestmentPolicy, risk: RiskThresholds, recommendations: RecommendationThresholds) -> Self {
        Self {
            policy,
            risk,
            recommendations,
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(
            config.investment.clone(),
            config.risk.clone(),
            config.recommendations.clone(),
        )
    }

    pub fn assess(&self, summary: &FinancialSummary, events: &mut EventStore) -> InvestmentCapacity {
        self.assess_figures(summary.total_monthly_profit, summary.average_profit_margin, events)
    }

    /// assessment from the two portfolio figures that drive it
    pub fn assess_figures(
        &self,
        monthly_profit: Money,
        average_margin: Decimal,
        events: &mut EventStore,
    ) -> InvestmentCapacity {
        let available_for_investment = monthly_profit.apply(self.policy.safety_buffer.complement());
        let monthly_budget_for_loan = available_for_investment.apply(self.policy.loan_budget_fraction);

        let max_loan_amount = max_loan_amount(
            monthly_budget_for_loan,
            self.policy.annual_interest_rate,
            self.policy.term_months,
        );
        let recommended_down_payment = max_loan_amount.apply(self.policy.down_payment_fraction);
        let max_property_price = max_loan_amount + recommended_down_payment;

        let risk_level = classify_risk(monthly_profit, average_margin, &self.risk);
        let recommendations = recommend(
            monthly_profit,
            average_margin,
            risk_level,
            max_property_price,
            &self.recommendations,
        );

        debug!(
            "capacity: budget {} supports loan {}, price {}, risk {}",
            monthly_budget_for_loan, max_loan_amount, max_property_price, risk_level
        );
        events.emit(Event::CapacityAssessed {
            risk_level,
            max_property_price,
        });

        InvestmentCapacity {
            available_for_investment,
            monthly_budget_for_loan,
            max_loan_amount,
            recommended_down_payment,
            max_property_price,
            risk_level,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assess(profit: i64, margin: Decimal) -> InvestmentCapacity {
        InvestmentCapacityModel::default().assess_figures(Money::from_major(profit), margin, &mut EventStore::new())
    }

    fn cents(money: Money) -> Decimal {
        money.round_dp(2).as_decimal()
    }

    #[test]
    fn test_single_apartment_capacity() {
        let capacity = assess(340, dec!(75.56));

        assert_eq!(capacity.available_for_investment, Money::from_major(238));
        assert_eq!(capacity.monthly_budget_for_loan, Money::from_major(119));
        assert_eq!(cents(capacity.max_loan_amount), dec!(20518.67));
        assert_eq!(cents(capacity.recommended_down_payment), dec!(5129.67));
        assert_eq!(cents(capacity.max_property_price), dec!(25648.33));
        assert_eq!(capacity.risk_level, RiskLevel::High);
        assert_eq!(
            capacity.recommendations,
            vec![Recommendation::OptimizeProfitability, Recommendation::ImproveIncomeFirst]
        );
    }

    #[test]
    fn test_strong_portfolio_capacity() {
        let mut events = EventStore::new();
        let capacity =
            InvestmentCapacityModel::default().assess_figures(Money::from_major(5000), dec!(60), &mut events);

        assert_eq!(capacity.monthly_budget_for_loan, Money::from_major(1750));
        assert_eq!(cents(capacity.max_loan_amount), dec!(301745.09));
        assert_eq!(cents(capacity.max_property_price), dec!(377181.37));
        assert_eq!(capacity.risk_level, RiskLevel::Low);
        assert_eq!(
            capacity.recommendations,
            vec![Recommendation::FavorablyPositioned, Recommendation::MidRangeProperty]
        );
        assert_eq!(
            events.events(),
            &[Event::CapacityAssessed {
                risk_level: RiskLevel::Low,
                max_property_price: capacity.max_property_price,
            }]
        );
    }

    #[test]
    fn test_entry_level_band() {
        let capacity = assess(1200, dec!(25));
        assert_eq!(cents(capacity.max_loan_amount), dec!(72418.82));
        assert_eq!(cents(capacity.max_property_price), dec!(90523.53));
        assert_eq!(capacity.risk_level, RiskLevel::Medium);
        assert_eq!(capacity.recommendations, vec![Recommendation::EntryLevelOpportunities]);
    }

    #[test]
    fn test_zero_profit_boundary() {
        let capacity = assess(0, Decimal::ZERO);
        assert_eq!(capacity.monthly_budget_for_loan, Money::ZERO);
        assert_eq!(capacity.max_loan_amount, Money::ZERO);
        assert_eq!(capacity.max_property_price, Money::ZERO);
        assert_eq!(capacity.risk_level, RiskLevel::High);
        assert_eq!(
            capacity.recommendations,
            vec![
                Recommendation::OptimizeProfitability,
                Recommendation::ReduceCharges,
                Recommendation::ImproveIncomeFirst,
            ]
        );
    }

    #[test]
    fn test_loss_making_portfolio_cannot_borrow() {
        let capacity = assess(-400, dec!(-10));
        assert!(capacity.available_for_investment.is_negative());
        assert_eq!(capacity.max_loan_amount, Money::ZERO);
        assert_eq!(capacity.max_property_price, Money::ZERO);
    }

    #[test]
    fn test_conservative_policy_lowers_price() {
        let default_capacity = assess(2500, dec!(40));
        let conservative = InvestmentCapacityModel::from_config(&AnalyticsConfig::conservative())
            .assess_figures(Money::from_major(2500), dec!(40), &mut EventStore::new());

        assert_eq!(cents(default_capacity.max_property_price), dec!(188590.68));
        assert_eq!(conservative.monthly_budget_for_loan, Money::from_major(750));
        assert!(conservative.max_property_price < default_capacity.max_property_price);
    }

    #[test]
    fn test_financing_schedule_matches_budget() {
        let capacity = assess(2500, dec!(40));
        let policy = InvestmentPolicy::default();
        let schedule = capacity
            .financing_schedule(&policy, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap())
            .unwrap();

        assert_eq!(schedule.payments.len(), 240);
        assert_eq!(schedule.principal, capacity.max_loan_amount);
        assert!((schedule.level_payment - capacity.monthly_budget_for_loan).abs() < Money::from_decimal(dec!(0.01)));
        assert_eq!(schedule.balance_after_payment(240), Money::ZERO);
    }
}
