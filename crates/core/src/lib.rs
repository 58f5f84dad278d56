//! Perfolio Core - portfolio structure and performance engine.
//!
//! The crate is a pure computation layer: callers hand it already-fetched
//! transactions, price bars and FX rates, and it returns allocation snapshots
//! and time-/money-weighted returns. It performs no I/O and keeps no state
//! between requests.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod fx;
pub mod portfolio;
pub mod quotes;
pub mod settings;
pub mod transactions;
pub mod utils;

pub use engine::{MarketData, PerformanceRequest, PortfolioEngine, StructureRequest};
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
