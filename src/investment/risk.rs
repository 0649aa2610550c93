use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{RecommendationThresholds, RiskThresholds};
use crate::decimal::Money;
use crate::types::RiskLevel;

/// risk tier from monthly profit and margin; first matching tier wins
pub fn classify_risk(monthly_profit: Money, margin: Decimal, thresholds: &RiskThresholds) -> RiskLevel {
    if monthly_profit > thresholds.low_min_monthly_profit && margin > thresholds.low_min_margin {
        RiskLevel::Low
    } else if monthly_profit > thresholds.medium_min_monthly_profit && margin > thresholds.medium_min_margin {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// advice attached to an investment capacity assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    OptimizeProfitability,
    ReduceCharges,
    FavorablyPositioned,
    MidRangeProperty,
    EntryLevelOpportunities,
    ImproveIncomeFirst,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::OptimizeProfitability => {
                "Optimize the profitability of current properties before investing"
            }
            Recommendation::ReduceCharges => "Profit margin is low; look for ways to reduce charges",
            Recommendation::FavorablyPositioned => "The portfolio is favorably positioned for a new investment",
            Recommendation::MidRangeProperty => "Consider a mid-range property",
            Recommendation::EntryLevelOpportunities => "Look for entry-level rental opportunities",
            Recommendation::ImproveIncomeFirst => "Focus on improving current income before investing",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// applicable recommendations in rule order, always ending with one price band
pub fn recommend(
    monthly_profit: Money,
    margin: Decimal,
    risk_level: RiskLevel,
    max_property_price: Money,
    thresholds: &RecommendationThresholds,
) -> Vec<Recommendation> {
    let mut advice = Vec::new();

    if monthly_profit < thresholds.min_monthly_profit {
        advice.push(Recommendation::OptimizeProfitability);
    }
    if margin < thresholds.min_margin {
        advice.push(Recommendation::ReduceCharges);
    }
    if risk_level == RiskLevel::Low {
        advice.push(Recommendation::FavorablyPositioned);
    }

    advice.push(if max_property_price > thresholds.mid_range_price {
        Recommendation::MidRangeProperty
    } else if max_property_price > thresholds.entry_level_price {
        Recommendation::EntryLevelOpportunities
    } else {
        Recommendation::ImproveIncomeFirst
    });

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_risk_boundaries_are_strict() {
        let thresholds = RiskThresholds::default();
        assert_eq!(classify_risk(Money::from_major(2000), dec!(30), &thresholds), RiskLevel::Medium);
        assert_eq!(classify_risk(Money::from_major(2001), dec!(31), &thresholds), RiskLevel::Low);
        assert_eq!(classify_risk(Money::from_major(1000), dec!(50), &thresholds), RiskLevel::High);
        assert_eq!(classify_risk(Money::from_major(5000), dec!(20), &thresholds), RiskLevel::High);
        assert_eq!(classify_risk(Money::from_major(5000), dec!(25), &thresholds), RiskLevel::Medium);
    }

    #[test]
    fn test_struggling_portfolio_advice() {
        let advice = recommend(
            Money::from_major(340),
            dec!(15),
            RiskLevel::High,
            Money::from_major(25_648),
            &RecommendationThresholds::default(),
        );
        assert_eq!(
            advice,
            vec![
                Recommendation::OptimizeProfitability,
                Recommendation::ReduceCharges,
                Recommendation::ImproveIncomeFirst,
            ]
        );
    }

    #[test]
    fn test_price_bands() {
        let thresholds = RecommendationThresholds::default();
        let band = |price: i64| {
            *recommend(Money::from_major(800), dec!(40), RiskLevel::High, Money::from_major(price), &thresholds)
                .last()
                .unwrap()
        };
        assert_eq!(band(100_001), Recommendation::MidRangeProperty);
        assert_eq!(band(100_000), Recommendation::EntryLevelOpportunities);
        assert_eq!(band(50_001), Recommendation::EntryLevelOpportunities);
        assert_eq!(band(50_000), Recommendation::ImproveIncomeFirst);
    }

    #[test]
    fn test_low_risk_advice() {
        let advice = recommend(
            Money::from_major(5000),
            dec!(60),
            RiskLevel::Low,
            Money::from_major(377_181),
            &RecommendationThresholds::default(),
        );
        assert_eq!(advice, vec![Recommendation::FavorablyPositioned, Recommendation::MidRangeProperty]);
        assert_eq!(advice[1].to_string(), "Consider a mid-range property");
    }
}
