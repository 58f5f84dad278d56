//! Holdings module - positions and cash derived from transactions.

mod holdings_calculator;
mod holdings_model;

pub use holdings_calculator::*;
pub use holdings_model::*;
