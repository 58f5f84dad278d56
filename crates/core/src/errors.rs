//! Core error types for the performance engine.
//!
//! Every domain error is a value: calculators return them, services annotate
//! them on response items, and nothing is coerced into a numeric placeholder.

use thiserror::Error;

use crate::fx::FxError;
use crate::portfolio::performance::ReturnError;
use crate::quotes::PriceError;
use crate::transactions::TransactionError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] TransactionError),

    #[error("FX rate unavailable: {0}")]
    FxRateUnavailable(#[from] FxError),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(#[from] PriceError),

    #[error("Undefined return: {0}")]
    UndefinedReturn(#[from] ReturnError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised for malformed requests or settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Currency '{0}' is not supported")]
    UnsupportedCurrency(String),
}
