use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid range: begin {begin} is after end {end}")]
    InvalidRange { begin: NaiveDate, end: NaiveDate },

    #[error("Unknown granularity '{0}': expected one of year, month, week, day")]
    UnknownGranularity(String),

    #[error("Unknown measure '{0}': expected one of income, outgo, balance")]
    UnknownMeasure(String),

    #[error("Cannot resolve a default range: the ledger has no entries")]
    EmptyLedger,

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
