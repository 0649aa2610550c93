use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{AnalyticsError, Result};

/// default pattern grouping numbered rooms under their apartment
pub const DEFAULT_PROPERTY_PATTERN: &str = r"(?i)^appartement\s+\d+";

/// analytics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// length of the trailing window in months
    pub window_months: u32,
    /// property value as a multiple of average monthly revenue
    pub valuation_multiple: Decimal,
    /// regex whose leading match becomes the canonical property key
    pub property_prefix_pattern: String,
    /// shortfall still treated as fully paid
    pub settlement_tolerance: Money,
    pub investment: InvestmentPolicy,
    pub risk: RiskThresholds,
    pub recommendations: RecommendationThresholds,
}

/// financing assumptions for new acquisitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentPolicy {
    /// share of monthly profit withheld as a safety margin
    pub safety_buffer: Rate,
    /// share of the remaining surplus allocated to debt service
    pub loan_budget_fraction: Rate,
    /// down payment as a share of the loan amount
    pub down_payment_fraction: Rate,
    pub annual_interest_rate: Rate,
    pub term_months: u32,
}

/// risk tier thresholds, compared with strict `>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low_min_monthly_profit: Money,
    /// percent
    pub low_min_margin: Decimal,
    pub medium_min_monthly_profit: Money,
    /// percent
    pub medium_min_margin: Decimal,
}

/// thresholds driving the recommendation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// below this monthly profit, optimize before investing
    pub min_monthly_profit: Money,
    /// below this margin (percent), reduce charges
    pub min_margin: Decimal,
    pub mid_range_price: Money,
    pub entry_level_price: Money,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_months: 12,
            valuation_multiple: dec!(120),
            property_prefix_pattern: DEFAULT_PROPERTY_PATTERN.to_string(),
            settlement_tolerance: Money::ZERO,
            investment: InvestmentPolicy::default(),
            risk: RiskThresholds::default(),
            recommendations: RecommendationThresholds::default(),
        }
    }
}

impl Default for InvestmentPolicy {
    fn default() -> Self {
        Self {
            safety_buffer: Rate::from_percentage(30),
            loan_budget_fraction: Rate::from_percentage(50),
            down_payment_fraction: Rate::from_percentage(25),
            annual_interest_rate: Rate::from_bps(350),
            term_months: 240,
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_min_monthly_profit: Money::from_major(2000),
            low_min_margin: dec!(30),
            medium_min_monthly_profit: Money::from_major(1000),
            medium_min_margin: dec!(20),
        }
    }
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            min_monthly_profit: Money::from_major(500),
            min_margin: dec!(20),
            mid_range_price: Money::from_major(100_000),
            entry_level_price: Money::from_major(50_000),
        }
    }
}

impl AnalyticsConfig {
    /// tighter financing assumptions: bigger buffer, larger down payment,
    /// higher rate over a shorter term
    pub fn conservative() -> Self {
        Self {
            investment: InvestmentPolicy {
                safety_buffer: Rate::from_percentage(40),
                loan_budget_fraction: Rate::from_percentage(50),
                down_payment_fraction: Rate::from_percentage(30),
                annual_interest_rate: Rate::from_bps(450),
                term_months: 180,
            },
            ..Self::default()
        }
    }

    /// load configuration from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_months == 0 {
            return Err(AnalyticsError::InvalidConfiguration {
                message: "window_months must be at least 1".to_string(),
            });
        }

        if self.valuation_multiple <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidConfiguration {
                message: format!("valuation_multiple must be positive, got {}", self.valuation_multiple),
            });
        }

        if self.settlement_tolerance.is_negative() {
            return Err(AnalyticsError::InvalidConfiguration {
                message: format!("settlement_tolerance cannot be negative, got {}", self.settlement_tolerance),
            });
        }

        self.investment.validate()?;
        self.risk.validate()?;
        self.recommendations.validate()
    }
}

impl InvestmentPolicy {
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("safety_buffer", self.safety_buffer),
            ("loan_budget_fraction", self.loan_budget_fraction),
            ("down_payment_fraction", self.down_payment_fraction),
        ];
        for (field, value) in fractions {
            if !value.is_fraction() {
                return Err(AnalyticsError::InvalidFraction {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.annual_interest_rate < Rate::ZERO {
            return Err(AnalyticsError::InvalidConfiguration {
                message: format!("annual_interest_rate cannot be negative, got {}", self.annual_interest_rate),
            });
        }

        if self.term_months == 0 {
            return Err(AnalyticsError::InvalidConfiguration {
                message: "term_months must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.medium_min_monthly_profit > self.low_min_monthly_profit
            || self.medium_min_margin > self.low_min_margin
        {
            return Err(AnalyticsError::InvalidConfiguration {
                message: "medium risk thresholds cannot exceed low risk thresholds".to_string(),
            });
        }
        Ok(())
    }
}

impl RecommendationThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.entry_level_price > self.mid_range_price {
            return Err(AnalyticsError::InvalidConfiguration {
                message: format!(
                    "entry_level_price {} exceeds mid_range_price {}",
                    self.entry_level_price, self.mid_range_price
                ),
            });
        }
        Ok(())
    }
}
