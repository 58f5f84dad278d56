//! Holdings state models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A position in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    /// Currency the symbol trades in
    pub currency: String,
    /// Share count; negative only for short positions
    pub quantity: Decimal,
    /// Cost of the long quantity, fees included, in `currency`
    pub cost_basis: Decimal,
}

impl Holding {
    pub fn new(symbol: &str, currency: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            currency: currency.to_string(),
            quantity: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
        }
    }

    /// Average cost per share, `None` when nothing long is held.
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.quantity > Decimal::ZERO {
            Some(self.cost_basis / self.quantity)
        } else {
            None
        }
    }
}

/// Positions and cash balances at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioState {
    /// Key: symbol
    pub positions: BTreeMap<String, Holding>,
    /// Key: currency as recorded on the transactions
    pub cash_balances: BTreeMap<String, Decimal>,
}

impl PortfolioState {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.cash_balances.values().all(|b| b.is_zero())
    }

    pub fn quantity_of(&self, symbol: &str) -> Decimal {
        self.positions
            .get(symbol)
            .map_or(Decimal::ZERO, |h| h.quantity)
    }
}

/// Position of a snapshot within a single date.
///
/// Variants are ordered the way they occur during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotPhase {
    /// Every transaction dated before the date
    BeforeFlows,
    /// Plus the external flows of the date
    AfterFlows,
    /// Plus every transaction of the date
    EndOfDay,
}

/// A (date, phase) pair at which the portfolio is valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub date: NaiveDate,
    pub phase: SnapshotPhase,
}

impl ValuationPoint {
    pub fn new(date: NaiveDate, phase: SnapshotPhase) -> Self {
        Self { date, phase }
    }

    pub fn before_flows(date: NaiveDate) -> Self {
        Self::new(date, SnapshotPhase::BeforeFlows)
    }

    pub fn after_flows(date: NaiveDate) -> Self {
        Self::new(date, SnapshotPhase::AfterFlows)
    }

    pub fn end_of_day(date: NaiveDate) -> Self {
        Self::new(date, SnapshotPhase::EndOfDay)
    }
}

impl std::fmt::Display for ValuationPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.date, self.phase)
    }
}
