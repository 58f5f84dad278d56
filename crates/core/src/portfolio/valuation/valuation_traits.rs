//! Valuation seam used by the performance calculators.

use rust_decimal::Decimal;

use crate::errors::Result;
use crate::portfolio::holdings::ValuationPoint;

/// Values the whole portfolio, in base currency, at a point in time.
pub trait PortfolioValuer: Send + Sync {
    fn value_at(&self, point: ValuationPoint) -> Result<Decimal>;

    /// Values several points, returning them in the order given.
    fn value_points(&self, points: &[ValuationPoint]) -> Vec<(ValuationPoint, Result<Decimal>)> {
        points
            .iter()
            .map(|point| (*point, self.value_at(*point)))
            .collect()
    }
}
