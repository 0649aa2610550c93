//! Records supplied by the external repositories. The pipeline reads these and
//! never persists anything back.

use chrono::NaiveDate;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{LeaseStatus, MonthKey, PaymentStatus, PaymentType};

/// rent or charge payment recorded against a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub id: String,
    pub tenant_name: String,
    /// may carry a room suffix, e.g. "Appartement 13 - Chambre 2"
    pub property: String,
    #[serde(default, deserialize_with = "lenient_input::deserialize_option_date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_input::deserialize_option_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_input::deserialize_option_money")]
    pub paid_amount: Option<Money>,
    #[serde(default, deserialize_with = "lenient_input::deserialize_option_money")]
    pub rent_amount: Option<Money>,
    #[serde(default, deserialize_with = "lenient_input::deserialize_option_money")]
    pub contract_rent_amount: Option<Money>,
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub payment_type: PaymentType,
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl PaymentRecord {
    /// payment date, falling back to the due date
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.payment_date.or(self.due_date)
    }

    /// amount counted as revenue: paid, then contract rent, then rent, then zero
    pub fn revenue_amount(&self) -> Money {
        self.paid_amount
            .or(self.contract_rent_amount)
            .or(self.rent_amount)
            .unwrap_or(Money::ZERO)
    }
}

/// monthly running costs of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRecord {
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub id: String,
    pub property_name: String,
    /// `YYYY-MM`, kept raw so malformed keys surface as diagnostics
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub month: String,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub electricity: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub water: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub heating: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub maintenance: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub insurance: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub garbage: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub internet: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub taxes: Money,
    #[serde(default, deserialize_with = "lenient_input::deserialize_money")]
    pub total: Money,
}

impl ChargeRecord {
    pub fn month_key(&self) -> Result<MonthKey> {
        self.month.parse()
    }

    /// sum of the per-category fields; `total` is what the metrics use
    pub fn category_sum(&self) -> Money {
        [
            self.electricity,
            self.water,
            self.heating,
            self.maintenance,
            self.insurance,
            self.garbage,
            self.internet,
            self.taxes,
        ]
        .iter()
        .sum()
    }
}

/// lease contract between a tenant and a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub id: String,
    pub tenant: String,
    pub property: String,
    /// rent with currency and unit suffix, e.g. "650€/mois"
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub amount: String,
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub status: LeaseStatus,
    #[serde(default, deserialize_with = "lenient_input::deserialize_option_date")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(default, deserialize_with = "lenient_input::null_as_default")]
    pub id: String,
    pub name: String,
}

/// record left out of a snapshot because it could not be decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub collection: String,
    /// position in the source collection
    pub index: usize,
    pub record_id: Option<String>,
    pub reason: String,
}

/// everything one analytics run reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub charges: Vec<ChargeRecord>,
    #[serde(default)]
    pub contracts: Vec<ContractRecord>,
    #[serde(skip)]
    pub skipped: Vec<SkippedRecord>,
}

/// collections as raw documents, decoded one record at a time
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    properties: Vec<serde_json::Value>,
    #[serde(default)]
    payments: Vec<serde_json::Value>,
    #[serde(default)]
    charges: Vec<serde_json::Value>,
    #[serde(default)]
    contracts: Vec<serde_json::Value>,
}

impl PortfolioSnapshot {
    /// load a snapshot; records that fail to decode are skipped and listed in `skipped`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        let mut skipped = Vec::new();

        Ok(Self {
            properties: decode_all("properties", raw.properties, &mut skipped),
            payments: decode_all("payments", raw.payments, &mut skipped),
            charges: decode_all("charges", raw.charges, &mut skipped),
            contracts: decode_all("contracts", raw.contracts, &mut skipped),
            skipped,
        })
    }
}

fn decode_all<T: DeserializeOwned>(
    collection: &str,
    documents: Vec<serde_json::Value>,
    skipped: &mut Vec<SkippedRecord>,
) -> Vec<T> {
    let mut records = Vec::with_capacity(documents.len());

    for (index, document) in documents.into_iter().enumerate() {
        let record_id = document.get("id").and_then(|id| id.as_str()).map(str::to_string);
        match serde_json::from_value(document) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("skipping {} record {} ({:?}): {}", collection, index, record_id, e);
                skipped.push(SkippedRecord {
                    collection: collection.to_string(),
                    index,
                    record_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    records
}

/// field readers for documents edited by hand: blanks and nulls read as absent,
/// numbers may arrive as strings and dates as timestamps
mod lenient_input {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::{Number, Value};

    use crate::decimal::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MoneyInput {
        String(String),
        Number(Number),
        Null,
    }

    fn parse_money(value: &str) -> Result<Money, String> {
        let trimmed = value.trim();
        trimmed
            .parse::<Money>()
            .or_else(|_| rust_decimal::Decimal::from_scientific(trimmed).map(Money::from_decimal))
            .map_err(|e| format!("invalid amount '{}': {}", value, e))
    }

    pub fn deserialize_option_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<MoneyInput>::deserialize(deserializer)? {
            None | Some(MoneyInput::Null) => Ok(None),
            Some(MoneyInput::String(s)) if s.trim().is_empty() => Ok(None),
            Some(MoneyInput::String(s)) => parse_money(&s).map(Some).map_err(D::Error::custom),
            Some(MoneyInput::Number(n)) => parse_money(&n.to_string()).map(Some).map_err(D::Error::custom),
        }
    }

    pub fn deserialize_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(deserialize_option_money(deserializer)?.unwrap_or(Money::ZERO))
    }

    /// `YYYY-MM-DD`, an RFC 3339 or naive date-time, or a `{seconds, nanoseconds}` timestamp
    pub fn deserialize_option_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => parse_date(s.trim())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", s))),
            Value::Object(fields) => fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|at| Some(at.date_naive()))
                .ok_or_else(|| D::Error::custom("invalid timestamp object")),
            other => Err(D::Error::custom(format!("invalid date {}", other))),
        }
    }

    fn parse_date(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|at| at.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|at| at.date())
            })
    }

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}
