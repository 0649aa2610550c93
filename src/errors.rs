use thiserror::Error;

use crate::decimal::Rate;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid property pattern {pattern:?}: {source}")]
    InvalidPropertyPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("empty amount")]
    EmptyAmount,

    #[error("no numeric value in amount: {input:?}")]
    MissingDigits {
        input: String,
    },

    #[error("negative amount not allowed: {input:?}")]
    NegativeAmount {
        input: String,
    },

    #[error("malformed number {number:?} in amount {input:?}")]
    MalformedNumber {
        input: String,
        number: String,
    },

    #[error("invalid month key: {value:?}, expected YYYY-MM")]
    InvalidMonthKey {
        value: String,
    },

    #[error("invalid fraction for {field}: {value}")]
    InvalidFraction {
        field: String,
        value: Rate,
    },

    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
