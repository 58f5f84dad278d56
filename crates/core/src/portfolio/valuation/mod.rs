pub mod valuation_calculator;
mod valuation_traits;

pub use valuation_calculator::*;
pub use valuation_traits::PortfolioValuer;
