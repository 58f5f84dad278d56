//! Transactions module - input records, validation, ordering and flow classification.

mod flow_classifier;
pub mod normalizer;
mod transactions_errors;
mod transactions_model;

pub use flow_classifier::{classify_flow, is_external_flow, FlowType};
pub use normalizer::{normalize, validate_transaction};
pub use transactions_errors::TransactionError;
pub use transactions_model::{Transaction, TransactionKind};
