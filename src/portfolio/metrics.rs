use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Months, NaiveDate, Utc};
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::decimal::Money;
use crate::events::{Event, EventStore, ExclusionReason};
use crate::portfolio::aggregation::PropertyBucket;
use crate::types::MonthKey;

const MONTHS_PER_YEAR: i64 = 12;

/// revenue and charges observed in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFigures {
    pub month: MonthKey,
    pub revenue: Money,
    pub charges: Money,
}

/// financial profile of one canonical property over the trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFinancialProfile {
    pub property: String,
    pub monthly_revenue: Money,
    pub annual_revenue: Money,
    pub monthly_charges: Money,
    pub annual_charges: Money,
    pub monthly_profit: Money,
    pub annual_profit: Money,
    /// percent
    pub profit_margin: Decimal,
    pub estimated_property_value: Money,
    /// percent, against the estimated value
    pub roi: Decimal,
    pub months_with_revenue: usize,
    pub months_with_charges: usize,
    pub payment_count: usize,
    pub charge_count: usize,
    pub months: Vec<MonthlyFigures>,
}

/// portfolio-wide totals over the trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub as_of: DateTime<Utc>,
    pub window_start: NaiveDate,
    pub total_monthly_revenue: Money,
    pub total_annual_revenue: Money,
    pub total_monthly_charges: Money,
    pub total_annual_charges: Money,
    pub total_monthly_profit: Money,
    pub total_annual_profit: Money,
    /// percent
    pub average_profit_margin: Decimal,
    pub properties: Vec<PropertyFinancialProfile>,
}

impl FinancialSummary {
    pub fn property(&self, key: &str) -> Option<&PropertyFinancialProfile> {
        self.properties.iter().find(|p| p.property == key)
    }
}

/// average and annualized figures for one series of monthly buckets
struct Annualized {
    monthly: Money,
    annual: Money,
}

/// `Σ / n` and `Σ × 12 / n`, with `n` at least one
fn annualize(buckets: &BTreeMap<MonthKey, Money>) -> Annualized {
    let total: Money = buckets.values().sum();
    let observed = Decimal::from(buckets.len().max(1) as i64);
    Annualized {
        monthly: total / observed,
        annual: Money::from_decimal(total.as_decimal() * Decimal::from(MONTHS_PER_YEAR) / observed),
    }
}

/// derives per-property and portfolio figures from partitioned records
#[derive(Debug, Clone)]
pub struct FinancialMetricsEngine {
    window_months: u32,
    valuation_multiple: Decimal,
}

impl Default for FinancialMetricsEngine {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

impl FinancialMetricsEngine {
    pub fn new(window_months: u32, valuation_multiple: Decimal) -> Self {
        Self {
            window_months,
            valuation_multiple,
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.window_months, config.valuation_multiple)
    }

    /// first day still inside the trailing window
    pub fn window_start(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.date_naive();
        today
            .checked_sub_months(Months::new(self.window_months))
            .unwrap_or(NaiveDate::MIN)
    }

    /// profile every bucket and total them
    pub fn summarize(
        &self,
        buckets: &[PropertyBucket<'_>],
        now: DateTime<Utc>,
        events: &mut EventStore,
    ) -> FinancialSummary {
        let window_start = self.window_start(now);
        let properties: Vec<PropertyFinancialProfile> = buckets
            .iter()
            .map(|bucket| self.profile(bucket, window_start, events))
            .collect();

        let total = |f: fn(&PropertyFinancialProfile) -> Money| -> Money {
            properties.iter().map(f).sum()
        };
        let total_annual_revenue = total(|p| p.annual_revenue);
        let total_annual_profit = total(|p| p.annual_profit);

        let summary = FinancialSummary {
            as_of: now,
            window_start,
            total_monthly_revenue: total(|p| p.monthly_revenue),
            total_annual_revenue,
            total_monthly_charges: total(|p| p.monthly_charges),
            total_annual_charges: total(|p| p.annual_charges),
            total_monthly_profit: total(|p| p.monthly_profit),
            total_annual_profit,
            average_profit_margin: total_annual_profit.percent_of(total_annual_revenue),
            properties,
        };

        debug!(
            "summarized {} properties since {}: monthly profit {}, margin {}%",
            summary.properties.len(),
            window_start,
            summary.total_monthly_profit,
            summary.average_profit_margin.round_dp(2)
        );
        summary
    }

    /// figures for one property; records outside the window or malformed are skipped
    pub fn profile(
        &self,
        bucket: &PropertyBucket<'_>,
        window_start: NaiveDate,
        events: &mut EventStore,
    ) -> PropertyFinancialProfile {
        let (revenue, payment_count) = self.revenue_by_month(bucket, window_start, events);
        let (charges, charge_count) = self.charges_by_month(bucket, window_start, events);

        let income = annualize(&revenue);
        let costs = annualize(&charges);

        let annual_profit = income.annual - costs.annual;
        let estimated_property_value = income.monthly * self.valuation_multiple;

        let months: BTreeSet<MonthKey> = revenue.keys().chain(charges.keys()).copied().collect();
        let months = months
            .into_iter()
            .map(|month| MonthlyFigures {
                month,
                revenue: revenue.get(&month).copied().unwrap_or(Money::ZERO),
                charges: charges.get(&month).copied().unwrap_or(Money::ZERO),
            })
            .collect();

        events.emit(Event::PropertyProfiled {
            property: bucket.key.clone(),
            months_with_revenue: revenue.len(),
            months_with_charges: charges.len(),
        });

        PropertyFinancialProfile {
            property: bucket.key.clone(),
            monthly_revenue: income.monthly,
            annual_revenue: income.annual,
            monthly_charges: costs.monthly,
            annual_charges: costs.annual,
            monthly_profit: income.monthly - costs.monthly,
            annual_profit,
            profit_margin: annual_profit.percent_of(income.annual),
            estimated_property_value,
            roi: annual_profit.percent_of(estimated_property_value),
            months_with_revenue: revenue.len(),
            months_with_charges: charges.len(),
            payment_count,
            charge_count,
            months,
        }
    }

    /// paid payments inside the window, summed per month
    fn revenue_by_month(
        &self,
        bucket: &PropertyBucket<'_>,
        window_start: NaiveDate,
        events: &mut EventStore,
    ) -> (BTreeMap<MonthKey, Money>, usize) {
        let mut by_month: BTreeMap<MonthKey, Money> = BTreeMap::new();
        let mut counted = 0;

        for payment in &bucket.payments {
            let excluded = |reason: ExclusionReason| Event::PaymentExcluded {
                payment_id: payment.id.clone(),
                property: payment.property.clone(),
                reason,
            };

            if !payment.status.is_paid() {
                events.emit(excluded(ExclusionReason::NotPaid));
                continue;
            }
            let Some(date) = payment.effective_date() else {
                trace!("payment {} has no date", payment.id);
                events.emit(excluded(ExclusionReason::MissingDate));
                continue;
            };
            if date < window_start {
                events.emit(excluded(ExclusionReason::OutsideWindow));
                continue;
            }

            *by_month.entry(MonthKey::from_date(date)).or_default() += payment.revenue_amount();
            counted += 1;
        }

        (by_month, counted)
    }

    /// charges inside the window, summed per month by stored total
    fn charges_by_month(
        &self,
        bucket: &PropertyBucket<'_>,
        window_start: NaiveDate,
        events: &mut EventStore,
    ) -> (BTreeMap<MonthKey, Money>, usize) {
        let mut by_month: BTreeMap<MonthKey, Money> = BTreeMap::new();
        let mut counted = 0;

        for charge in &bucket.charges {
            let excluded = |reason: ExclusionReason| Event::ChargeExcluded {
                charge_id: charge.id.clone(),
                property: charge.property_name.clone(),
                reason,
            };

            let month = match charge.month_key() {
                Ok(month) => month,
                Err(err) => {
                    trace!("charge {} skipped: {}", charge.id, err);
                    events.emit(excluded(ExclusionReason::InvalidMonth));
                    continue;
                }
            };
            if month.first_day() < window_start {
                events.emit(excluded(ExclusionReason::OutsideWindow));
                continue;
            }

            let category_sum = charge.category_sum();
            if !category_sum.is_zero() && category_sum != charge.total {
                events.emit(Event::ChargeTotalMismatch {
                    charge_id: charge.id.clone(),
                    stored_total: charge.total,
                    category_sum,
                });
            }

            *by_month.entry(month).or_default() += charge.total;
            counted += 1;
        }

        (by_month, counted)
    }
}
