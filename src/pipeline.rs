use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::investment::{InvestmentCapacity, InvestmentCapacityModel};
use crate::portfolio::{FinancialMetricsEngine, FinancialSummary, PropertyAggregator, PropertyCanonicalizer};
use crate::reconciliation::{
    ContractMatcher, PaymentReconciler, SettlementPolicy, TenantPropertyMatcher, ThresholdSettlement,
};
use crate::records::{PaymentRecord, PortfolioSnapshot};

/// result of one analytics run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub as_of: DateTime<Utc>,
    /// payments after reconciliation, in input order
    pub payments: Vec<PaymentRecord>,
    pub summary: FinancialSummary,
    pub capacity: InvestmentCapacity,
    pub events: Vec<Event>,
}

/// reconcile, aggregate, profile and assess a portfolio snapshot
pub struct AnalyticsPipeline {
    config: AnalyticsConfig,
    reconciler: PaymentReconciler,
    aggregator: PropertyAggregator,
    metrics: FinancialMetricsEngine,
    capacity: InvestmentCapacityModel,
}

impl AnalyticsPipeline {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        let canonicalizer = PropertyCanonicalizer::new(&config.property_prefix_pattern)?;

        Ok(Self {
            reconciler: PaymentReconciler::new(
                Box::new(TenantPropertyMatcher),
                Box::new(ThresholdSettlement::new(config.settlement_tolerance)),
            ),
            aggregator: PropertyAggregator::new(canonicalizer),
            metrics: FinancialMetricsEngine::from_config(&config),
            capacity: InvestmentCapacityModel::from_config(&config),
            config,
        })
    }

    pub fn with_matcher(mut self, matcher: impl ContractMatcher + 'static) -> Self {
        self.reconciler = self.reconciler.with_matcher(Box::new(matcher));
        self
    }

    pub fn with_settlement_policy(mut self, policy: impl SettlementPolicy + 'static) -> Self {
        self.reconciler = self.reconciler.with_settlement_policy(Box::new(policy));
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// run every stage against one reading of the clock
    pub fn run(&self, snapshot: &PortfolioSnapshot, time_provider: &SafeTimeProvider) -> AnalyticsReport {
        let now = time_provider.now();
        let mut events = EventStore::new();

        for skipped in &snapshot.skipped {
            events.emit(Event::RecordSkipped {
                collection: skipped.collection.clone(),
                index: skipped.index,
                record_id: skipped.record_id.clone(),
                reason: skipped.reason.clone(),
            });
        }

        let payments = self
            .reconciler
            .reconcile_all(&snapshot.payments, &snapshot.contracts, &mut events);
        let buckets = self
            .aggregator
            .partition(&snapshot.properties, &payments, &snapshot.charges);
        let summary = self.metrics.summarize(&buckets, now, &mut events);
        let capacity = self.capacity.assess(&summary, &mut events);

        debug!(
            "analytics run at {}: {} properties, {} diagnostics",
            now,
            summary.properties.len(),
            events.events().len()
        );

        AnalyticsReport {
            as_of: now,
            payments,
            summary,
            capacity,
            events: events.take_events(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::errors::AnalyticsError;
    use crate::investment::Recommendation;
    use crate::records::ContractRecord;
    use crate::types::{PaymentStatus, RiskLevel};
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "properties": [
            { "id": "prop-1", "name": "Appartement 13" },
            { "id": "prop-2", "name": "Studio Gare" }
        ],
        "payments": [
            {
                "id": "p1", "tenantName": "Marie Dupont", "property": "Appartement 13 - Chambre 1",
                "paymentDate": "2025-06-05", "paidAmount": 450, "rentAmount": 400, "status": "Payé"
            },
            {
                "id": "p2", "tenantName": "Marie Dupont", "property": "Appartement 13 - Chambre 1",
                "paymentDate": "2025-07-05", "paidAmount": 450, "rentAmount": 400, "status": "Payé"
            },
            {
                "id": "p3", "tenantName": "Jean Martin", "property": "Appartement 13 - Chambre 2",
                "dueDate": "2025-07-01", "paidAmount": 200, "rentAmount": 500, "status": "Payé"
            },
            {
                "id": "p4", "tenantName": "Paul Durand", "property": "Maison Lyon",
                "paymentDate": "2025-09-01", "paidAmount": 800, "status": "Payé"
            }
        ],
        "charges": [
            { "id": "c1", "propertyName": "Appartement 13", "month": "2025-06", "total": 100 },
            { "id": "c2", "propertyName": "Appartement 13", "month": "2025-07", "total": 120 }
        ],
        "contracts": [
            {
                "id": "k1", "tenant": "Marie Dupont", "property": "Appartement 13 - Chambre 1",
                "amount": "450€/mois", "status": "Signé"
            },
            {
                "id": "k2", "tenant": "Jean Martin", "property": "Appartement 13 - Chambre 2",
                "amount": "500 € / mois", "status": "Signé"
            }
        ]
    }"#;

    fn clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 10, 19, 8, 0, 0).unwrap()))
    }

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot::from_json(SNAPSHOT).unwrap()
    }

    #[test]
    fn test_full_run() {
        let pipeline = AnalyticsPipeline::new(AnalyticsConfig::default()).unwrap();
        let report = pipeline.run(&snapshot(), &clock());

        // contract amounts replace the recorded rent
        assert_eq!(report.payments[0].rent_amount, Some(Money::from_major(450)));
        assert_eq!(report.payments[0].contract_rent_amount, Some(Money::from_major(450)));
        // short payment against its contract is downgraded and excluded
        assert_eq!(report.payments[2].status, PaymentStatus::Partial);
        // no contract: rent copied across, status kept
        assert_eq!(report.payments[3].contract_rent_amount, None);
        assert_eq!(report.payments[3].status, PaymentStatus::Paid);

        let keys: Vec<&str> = report.summary.properties.iter().map(|p| p.property.as_str()).collect();
        assert_eq!(keys, vec!["Appartement 13", "Maison Lyon", "Studio Gare"]);

        let apartment = report.summary.property("Appartement 13").unwrap();
        assert_eq!(apartment.monthly_revenue, Money::from_major(450));
        assert_eq!(apartment.monthly_charges, Money::from_major(110));
        assert_eq!(apartment.annual_profit, Money::from_major(4080));
        assert_eq!(apartment.profit_margin.round_dp(2), dec!(75.56));
        assert_eq!(apartment.roi.round_dp(2), dec!(7.56));

        let studio = report.summary.property("Studio Gare").unwrap();
        assert_eq!(studio.annual_revenue, Money::ZERO);
        assert_eq!(studio.profit_margin, dec!(0));

        assert_eq!(report.summary.total_monthly_profit, Money::from_major(1140));
        assert_eq!(report.summary.total_annual_revenue, Money::from_major(15_000));
        assert_eq!(report.summary.average_profit_margin, dec!(91.2));

        let capacity = &report.capacity;
        assert_eq!(capacity.monthly_budget_for_loan, Money::from_major(399));
        assert_eq!(capacity.max_loan_amount.round_dp(2).as_decimal(), dec!(68797.88));
        assert_eq!(capacity.max_property_price.round_dp(2).as_decimal(), dec!(85997.35));
        assert_eq!(capacity.risk_level, RiskLevel::Medium);
        assert_eq!(capacity.recommendations, vec![Recommendation::EntryLevelOpportunities]);

        assert!(report.events.contains(&Event::PaymentStatusChanged {
            payment_id: "p3".to_string(),
            old_status: PaymentStatus::Paid,
            new_status: PaymentStatus::Partial,
        }));
        assert!(matches!(report.events.last(), Some(Event::CapacityAssessed { .. })));
    }

    #[test]
    fn test_runs_are_idempotent() {
        let pipeline = AnalyticsPipeline::new(AnalyticsConfig::default()).unwrap();
        let snapshot = snapshot();
        let time = clock();

        let first = pipeline.run(&snapshot, &time);
        let second = pipeline.run(&snapshot, &time);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clock_moves_the_window() {
        let pipeline = AnalyticsPipeline::new(AnalyticsConfig::default()).unwrap();
        let later = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()));
        let report = pipeline.run(&snapshot(), &later);

        // June and July 2025 are now more than twelve months back
        let apartment = report.summary.property("Appartement 13").unwrap();
        assert_eq!(apartment.payment_count, 0);
        assert_eq!(apartment.charge_count, 0);
        assert_eq!(report.summary.property("Maison Lyon").unwrap().payment_count, 1);
    }

    #[test]
    fn test_undecodable_records_are_reported() {
        let json = r#"{
            "payments": [
                { "id": "p1", "tenantName": "Marie Dupont", "property": "Studio Gare",
                  "paymentDate": "2025-09-05T10:00:00Z", "paidAmount": "", "rentAmount": 600, "status": "Payé" },
                { "id": "p2", "tenantName": ["Jean"], "property": "Studio Gare", "paidAmount": 600 }
            ],
            "charges": [
                { "id": "c1", "propertyName": "Studio Gare", "month": "2025-09", "total": null, "water": 30 }
            ]
        }"#;
        let snapshot = PortfolioSnapshot::from_json(json).unwrap();
        let pipeline = AnalyticsPipeline::new(AnalyticsConfig::default()).unwrap();
        let report = pipeline.run(&snapshot, &clock());

        assert!(matches!(
            report.events.first(),
            Some(Event::RecordSkipped { collection, index: 1, record_id: Some(id), .. })
                if collection == "payments" && id == "p2"
        ));

        // blank paid amount falls back to the recorded rent; null total counts as zero
        let studio = report.summary.property("Studio Gare").unwrap();
        assert_eq!(studio.payment_count, 1);
        assert_eq!(studio.monthly_revenue, Money::from_major(600));
        assert_eq!(studio.charge_count, 1);
        assert_eq!(studio.monthly_charges, Money::ZERO);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let config = AnalyticsConfig {
            property_prefix_pattern: "(?i)^appartement(".to_string(),
            ..AnalyticsConfig::default()
        };
        assert!(matches!(
            AnalyticsPipeline::new(config),
            Err(AnalyticsError::InvalidPropertyPattern { .. })
        ));

        let config = AnalyticsConfig {
            window_months: 0,
            ..AnalyticsConfig::default()
        };
        assert!(matches!(
            AnalyticsPipeline::new(config),
            Err(AnalyticsError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_pluggable_strategies() {
        struct PropertyOnly;
        impl ContractMatcher for PropertyOnly {
            fn find_match<'a>(&self, payment: &PaymentRecord, contracts: &'a [ContractRecord]) -> Option<&'a ContractRecord> {
                contracts.iter().find(|c| c.property == payment.property)
            }
        }

        let pipeline = AnalyticsPipeline::new(AnalyticsConfig::default())
            .unwrap()
            .with_matcher(PropertyOnly)
            .with_settlement_policy(ThresholdSettlement::new(Money::from_major(300)));
        let report = pipeline.run(&snapshot(), &clock());

        // 200 paid against 500 is within the 300 tolerance
        assert_eq!(report.payments[2].status, PaymentStatus::Paid);
        let apartment = report.summary.property("Appartement 13").unwrap();
        assert_eq!(apartment.payment_count, 3);
    }
}
