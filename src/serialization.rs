//! Presentation views of an analytics report.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::events::Event;
use crate::investment::InvestmentCapacity;
use crate::pipeline::AnalyticsReport;
use crate::portfolio::{FinancialSummary, PropertyFinancialProfile};
use crate::types::RiskLevel;

const PERCENT_DP: u32 = 2;
const CURRENCY_DP: u32 = 2;

/// serializable view of a report, figures rounded for display
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub as_of: DateTime<Utc>,
    pub window_start: NaiveDate,
    pub totals: TotalsView,
    pub properties: Vec<PropertyView>,
    pub capacity: CapacityView,
    pub diagnostics: DiagnosticsView,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsView {
    pub monthly_revenue: Money,
    pub annual_revenue: Money,
    pub monthly_charges: Money,
    pub annual_charges: Money,
    pub monthly_profit: Money,
    pub annual_profit: Money,
    pub average_profit_margin: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyView {
    pub property: String,
    pub monthly_revenue: Money,
    pub annual_revenue: Money,
    pub monthly_charges: Money,
    pub annual_charges: Money,
    pub monthly_profit: Money,
    pub annual_profit: Money,
    pub profit_margin: Decimal,
    pub estimated_property_value: Money,
    pub roi: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityView {
    pub available_for_investment: Money,
    pub monthly_budget_for_loan: Money,
    pub max_loan_amount: Money,
    pub recommended_down_payment: Money,
    pub max_property_price: Money,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

/// counts of absorbed conditions by kind
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsView {
    pub skipped_records: usize,
    pub unmatched_payments: usize,
    pub unparsable_contracts: usize,
    pub status_changes: usize,
    pub excluded_payments: usize,
    pub excluded_charges: usize,
    pub charge_total_mismatches: usize,
}

fn cents(amount: Money) -> Money {
    amount.round_dp(CURRENCY_DP)
}

impl TotalsView {
    fn from_summary(summary: &FinancialSummary) -> Self {
        TotalsView {
            monthly_revenue: cents(summary.total_monthly_revenue),
            annual_revenue: cents(summary.total_annual_revenue),
            monthly_charges: cents(summary.total_monthly_charges),
            annual_charges: cents(summary.total_annual_charges),
            monthly_profit: cents(summary.total_monthly_profit),
            annual_profit: cents(summary.total_annual_profit),
            average_profit_margin: summary.average_profit_margin.round_dp(PERCENT_DP),
        }
    }
}

impl PropertyView {
    fn from_profile(profile: &PropertyFinancialProfile) -> Self {
        PropertyView {
            property: profile.property.clone(),
            monthly_revenue: cents(profile.monthly_revenue),
            annual_revenue: cents(profile.annual_revenue),
            monthly_charges: cents(profile.monthly_charges),
            annual_charges: cents(profile.annual_charges),
            monthly_profit: cents(profile.monthly_profit),
            annual_profit: cents(profile.annual_profit),
            profit_margin: profile.profit_margin.round_dp(PERCENT_DP),
            estimated_property_value: cents(profile.estimated_property_value),
            roi: profile.roi.round_dp(PERCENT_DP),
        }
    }
}

impl CapacityView {
    fn from_capacity(capacity: &InvestmentCapacity) -> Self {
        CapacityView {
            available_for_investment: cents(capacity.available_for_investment),
            monthly_budget_for_loan: cents(capacity.monthly_budget_for_loan),
            max_loan_amount: cents(capacity.max_loan_amount),
            recommended_down_payment: cents(capacity.recommended_down_payment),
            max_property_price: cents(capacity.max_property_price),
            risk_level: capacity.risk_level,
            recommendations: capacity.recommendations.iter().map(|r| r.message().to_string()).collect(),
        }
    }
}

impl DiagnosticsView {
    fn from_events(events: &[Event]) -> Self {
        let mut view = DiagnosticsView::default();
        for event in events {
            match event {
                Event::RecordSkipped { .. } => view.skipped_records += 1,
                Event::ContractNotFound { .. } => view.unmatched_payments += 1,
                Event::ContractAmountUnparsable { .. } => view.unparsable_contracts += 1,
                Event::PaymentStatusChanged { .. } => view.status_changes += 1,
                Event::PaymentExcluded { .. } => view.excluded_payments += 1,
                Event::ChargeExcluded { .. } => view.excluded_charges += 1,
                Event::ChargeTotalMismatch { .. } => view.charge_total_mismatches += 1,
                Event::PaymentReconciled { .. }
                | Event::PropertyProfiled { .. }
                | Event::CapacityAssessed { .. } => {}
            }
        }
        view
    }
}

impl ReportView {
    pub fn from_report(report: &AnalyticsReport) -> Self {
        ReportView {
            as_of: report.as_of,
            window_start: report.summary.window_start,
            totals: TotalsView::from_summary(&report.summary),
            properties: report.summary.properties.iter().map(PropertyView::from_profile).collect(),
            capacity: CapacityView::from_capacity(&report.capacity),
            diagnostics: DiagnosticsView::from_events(&report.events),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl AnalyticsReport {
    pub fn to_view(&self) -> ReportView {
        ReportView::from_report(self)
    }

    /// pretty json rendering of the report view
    pub fn to_json(&self) -> Result<String> {
        self.to_view().to_json_pretty()
    }
}
