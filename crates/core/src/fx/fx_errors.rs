use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// No direct rate on the date nor within the backward tolerance window.
    #[error("no {from}->{to} rate on {date} or within {tolerance_days} days before it")]
    RateUnavailable {
        from: String,
        to: String,
        date: NaiveDate,
        tolerance_days: i64,
    },
}
