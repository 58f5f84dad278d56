use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed transaction input. Raised before any computation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("transaction {id}: quantity must not be zero")]
    ZeroQuantity { id: String },

    #[error("transaction {id}: price {price} is negative")]
    NegativePrice { id: String, price: Decimal },

    #[error("transaction {id}: fee {fee} is negative")]
    NegativeFee { id: String, fee: Decimal },

    #[error("transaction {id}: currency '{currency}' is not recognized")]
    UnrecognizedCurrency { id: String, currency: String },

    #[error("transaction {id}: {kind} requires a symbol")]
    MissingSymbol { id: String, kind: String },

    #[error("transaction {id}: {symbol} is held in {expected}, not {actual}")]
    CurrencyMismatch {
        id: String,
        symbol: String,
        expected: String,
        actual: String,
    },

    #[error("transaction {id}: cannot sell {requested} {symbol}, only {held} held")]
    InsufficientQuantity {
        id: String,
        symbol: String,
        held: Decimal,
        requested: Decimal,
    },
}
