/// portfolio report - reconcile a small portfolio and print the analytics report
use rental_analytics_rs::chrono::{NaiveDate, TimeZone, Utc};
use rental_analytics_rs::{
    AnalyticsConfig, AnalyticsPipeline, PortfolioSnapshot, SafeTimeProvider, TimeSource,
};

const SNAPSHOT: &str = r#"{
    "properties": [
        { "id": "prop-1", "name": "Appartement 13" },
        { "id": "prop-2", "name": "Maison Lyon" }
    ],
    "payments": [
        { "id": "p1", "tenantName": "Marie Dupont", "property": "Appartement 13 - Chambre 1",
          "paymentDate": "2025-06-05", "paidAmount": 450, "rentAmount": 400, "status": "Payé" },
        { "id": "p2", "tenantName": "Marie Dupont", "property": "Appartement 13 - Chambre 1",
          "paymentDate": "2025-07-05", "paidAmount": 450, "rentAmount": 400, "status": "Payé" },
        { "id": "p3", "tenantName": "Jean Martin", "property": "Appartement 13 - Chambre 2",
          "dueDate": "2025-07-01", "paidAmount": 300, "status": "En retard" },
        { "id": "p4", "tenantName": "Paul Durand", "property": "Maison Lyon",
          "paymentDate": "2025-09-02", "paidAmount": 1450, "status": "Payé" }
    ],
    "charges": [
        { "id": "c1", "propertyName": "Appartement 13", "month": "2025-06",
          "electricity": 40, "water": 60, "total": 100 },
        { "id": "c2", "propertyName": "Appartement 13", "month": "2025-07", "total": 120 },
        { "id": "c3", "propertyName": "Maison Lyon", "month": "2025-09", "taxes": 150, "total": 150 }
    ],
    "contracts": [
        { "id": "k1", "tenant": "Marie Dupont", "property": "Appartement 13 - Chambre 1",
          "amount": "450€/mois", "status": "Signé" },
        { "id": "k2", "tenant": "Jean Martin", "property": "Appartement 13 - Chambre 2",
          "amount": "1 200,00 € par mois", "status": "Signé" }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = PortfolioSnapshot::from_json(SNAPSHOT)?;

    // pin the clock so the trailing window is reproducible
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 10, 19, 9, 0, 0).unwrap()));

    for (label, config) in [
        ("default", AnalyticsConfig::default()),
        ("conservative", AnalyticsConfig::conservative()),
    ] {
        let pipeline = AnalyticsPipeline::new(config)?;
        let report = pipeline.run(&snapshot, &time);

        println!("=== {} policy ===", label);
        println!("{}", report.to_json()?);

        let start = NaiveDate::from_ymd_opt(2025, 11, 1).ok_or("invalid start date")?;
        let schedule = report
            .capacity
            .financing_schedule(&pipeline.config().investment, start)?;
        if let Some(first) = schedule.get_payment(1) {
            println!(
                "first installment on {}: {} ({} interest), total interest {}",
                first.payment_date,
                first.payment_amount.round_dp(2),
                first.interest_portion.round_dp(2),
                schedule.total_interest.round_dp(2)
            );
        }
        println!();
    }

    Ok(())
}
