use std::collections::BTreeMap;

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use crate::config::DEFAULT_PROPERTY_PATTERN;
use crate::errors::{AnalyticsError, Result};
use crate::records::{ChargeRecord, PaymentRecord, PropertyRecord};

lazy_static! {
    static ref DEFAULT_PREFIX: Regex =
        Regex::new(DEFAULT_PROPERTY_PATTERN).expect("Invalid default property pattern");
}

/// canonical key of a property identifier using the default pattern
pub fn canonicalize(identifier: &str) -> &str {
    leading_match(&DEFAULT_PREFIX, identifier)
}

fn leading_match<'a>(prefix: &Regex, identifier: &'a str) -> &'a str {
    match prefix.find(identifier) {
        Some(m) if m.start() == 0 && !m.as_str().is_empty() => m.as_str(),
        _ => identifier,
    }
}

/// maps room-level identifiers onto their parent property
#[derive(Debug, Clone)]
pub struct PropertyCanonicalizer {
    prefix: Regex,
}

impl Default for PropertyCanonicalizer {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.clone(),
        }
    }
}

impl PropertyCanonicalizer {
    pub fn new(pattern: &str) -> Result<Self> {
        let prefix = Regex::new(pattern).map_err(|source| AnalyticsError::InvalidPropertyPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { prefix })
    }

    /// the leading pattern match, or the identifier unchanged
    pub fn canonicalize<'a>(&self, identifier: &'a str) -> &'a str {
        leading_match(&self.prefix, identifier)
    }
}

/// records sharing one canonical property key
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBucket<'a> {
    pub key: String,
    pub payments: Vec<&'a PaymentRecord>,
    pub charges: Vec<&'a ChargeRecord>,
}

impl<'a> PropertyBucket<'a> {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            payments: Vec::new(),
            charges: Vec::new(),
        }
    }
}

/// groups payments and charges by canonical property
#[derive(Debug, Clone, Default)]
pub struct PropertyAggregator {
    canonicalizer: PropertyCanonicalizer,
}

impl PropertyAggregator {
    pub fn new(canonicalizer: PropertyCanonicalizer) -> Self {
        Self { canonicalizer }
    }

    /// partition records by canonical key, ordered by key.
    ///
    /// Payments and charges are keyed independently; seeded properties get a
    /// bucket even when no record refers to them.
    pub fn partition<'a>(
        &self,
        properties: &[PropertyRecord],
        payments: &'a [PaymentRecord],
        charges: &'a [ChargeRecord],
    ) -> Vec<PropertyBucket<'a>> {
        let mut buckets: BTreeMap<String, PropertyBucket<'a>> = BTreeMap::new();

        for property in properties {
            let key = self.canonicalizer.canonicalize(&property.name);
            buckets.entry(key.to_string()).or_insert_with(|| PropertyBucket::new(key));
        }

        for payment in payments {
            let key = self.canonicalizer.canonicalize(&payment.property);
            buckets
                .entry(key.to_string())
                .or_insert_with(|| PropertyBucket::new(key))
                .payments
                .push(payment);
        }

        for charge in charges {
            let key = self.canonicalizer.canonicalize(&charge.property_name);
            buckets
                .entry(key.to_string())
                .or_insert_with(|| PropertyBucket::new(key))
                .charges
                .push(charge);
        }

        trace!("partitioned records into {} properties", buckets.len());
        buckets.into_values().collect()
    }
}
