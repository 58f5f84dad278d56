//! Price lookup error types.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    /// No close on the date nor within the staleness window before it.
    #[error("no close for {symbol} on {date} or within {staleness_days} days before it")]
    Unavailable {
        symbol: String,
        date: NaiveDate,
        staleness_days: i64,
    },
}
