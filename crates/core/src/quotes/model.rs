//! Price bar domain models.
//!
//! Bars are end-of-day observations handed to the engine by the caller. A bar
//! may carry corporate-action annotations: a cash dividend per share and a
//! split ratio effective on the bar date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Price Bar
// =============================================================================

/// One end-of-day observation for a symbol.
///
/// `close` is the as-traded close in the holding's currency. `split_ratio` is
/// the number of new shares per old share (2 for a 2-for-1 split) and takes
/// effect on `date`, so the close of that bar is already post-split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_ratio: Option<Decimal>,
}

impl PriceBar {
    pub fn new(symbol: &str, date: NaiveDate, close: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            close,
            dividend_amount: None,
            split_ratio: None,
        }
    }

    pub fn with_split(mut self, ratio: Decimal) -> Self {
        self.split_ratio = Some(ratio);
        self
    }

    pub fn with_dividend(mut self, amount: Decimal) -> Self {
        self.dividend_amount = Some(amount);
        self
    }
}

// =============================================================================
// Resolved Price
// =============================================================================

/// Result of a price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    /// Close adjusted to the resolver's share-count basis
    pub price: Decimal,
    /// Date of the bar the price came from
    pub date: NaiveDate,
    /// True when the bar predates the requested date
    pub stale: bool,
}

// =============================================================================
// Split Event
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitEvent {
    pub symbol: String,
    pub date: NaiveDate,
    pub ratio: Decimal,
}
