use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AnalyticsError, Result};

/// what a payment settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentType {
    /// monthly rent
    #[default]
    #[serde(rename = "loyer")]
    Rent,
    /// recoverable charges billed to the tenant
    #[serde(rename = "charges")]
    Charges,
}

/// settlement status of a payment, stored with its french label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    /// fully settled
    Paid,
    /// nothing received
    Late,
    /// received less than expected
    Partial,
    /// not yet due
    #[default]
    Pending,
    /// any label this library does not interpret
    Other(String),
}

impl PaymentStatus {
    pub fn label(&self) -> &str {
        match self {
            PaymentStatus::Paid => "Payé",
            PaymentStatus::Late => "En retard",
            PaymentStatus::Partial => "Partiel",
            PaymentStatus::Pending => "En attente",
            PaymentStatus::Other(label) => label,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl From<String> for PaymentStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Payé" => PaymentStatus::Paid,
            "En retard" => PaymentStatus::Late,
            "Partiel" => PaymentStatus::Partial,
            "En attente" => PaymentStatus::Pending,
            _ => PaymentStatus::Other(label),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// lease status of a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum LeaseStatus {
    Signed,
    #[default]
    Draft,
    Other(String),
}

impl LeaseStatus {
    pub fn label(&self) -> &str {
        match self {
            LeaseStatus::Signed => "Signé",
            LeaseStatus::Draft => "Brouillon",
            LeaseStatus::Other(label) => label,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, LeaseStatus::Signed)
    }
}

impl From<String> for LeaseStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Signé" => LeaseStatus::Signed,
            "Brouillon" => LeaseStatus::Draft,
            _ => LeaseStatus::Other(label),
        }
    }
}

impl From<LeaseStatus> for String {
    fn from(status: LeaseStatus) -> Self {
        status.label().to_string()
    }
}

/// investment readiness tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(label)
    }
}

/// calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::InvalidMonthKey {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// first calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for MonthKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnalyticsError::InvalidMonthKey {
            value: s.to_string(),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip_through_strings() {
        assert_eq!(PaymentStatus::from("Payé".to_string()), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from("En retard".to_string()), PaymentStatus::Late);
        assert_eq!(
            PaymentStatus::from("Annulé".to_string()),
            PaymentStatus::Other("Annulé".to_string())
        );
        assert_eq!(String::from(PaymentStatus::Partial), "Partiel");
        assert!(LeaseStatus::from("Signé".to_string()).is_signed());
        assert!(!LeaseStatus::from("Résilié".to_string()).is_signed());
    }

    #[test]
    fn test_status_json() {
        let status: PaymentStatus = serde_json::from_str("\"Payé\"").unwrap();
        assert!(status.is_paid());
        assert_eq!(serde_json::to_string(&PaymentStatus::Late).unwrap(), "\"En retard\"");

        let kind: PaymentType = serde_json::from_str("\"charges\"").unwrap();
        assert_eq!(kind, PaymentType::Charges);
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_month_key_parsing() {
        let key: MonthKey = "2025-06".parse().unwrap();
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 6);
        assert_eq!(key.to_string(), "2025-06");
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        for bad in ["2025-13", "2025-6", "25-06", "2025/06", "", "2025-00", "abcd-ef"] {
            assert!(bad.parse::<MonthKey>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_month_key_ordering() {
        let dec: MonthKey = "2024-12".parse().unwrap();
        let jan: MonthKey = "2025-01".parse().unwrap();
        assert!(dec < jan);
        assert_eq!(MonthKey::from_date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()), jan);
    }
}
