use chrono::NaiveDate;
use thiserror::Error;

/// A return that is mathematically undefined for its period.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReturnError {
    #[error("return for {start}..{end} is undefined: {reason}")]
    Undefined {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },
}
