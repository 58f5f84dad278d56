//! Allocation models for the portfolio structure snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One priced holding within the structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureItem {
    /// Symbol, or `CASH:{CCY}` for a cash balance
    pub symbol: String,
    pub quantity: Decimal,
    /// Unit price in base currency, so that `value = quantity x price`
    pub price: Decimal,
    /// Currency the holding is denominated in
    pub currency: String,
    /// Market value in base currency
    pub value: Decimal,
    /// Share of total value
    pub weight: Decimal,
    /// True when the price came from an earlier bar
    pub stale: bool,
}

/// A holding left out of the structure because it could not be valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedHolding {
    pub symbol: String,
    pub quantity: Decimal,
    pub reason: String,
}

/// Portfolio structure as of a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResponse {
    pub as_of: NaiveDate,
    /// Base currency
    pub currency: String,
    /// Total value in base currency of the resolved items
    pub total_value: Decimal,
    /// Items sorted by value descending, then symbol
    pub items: Vec<StructureItem>,
    #[serde(default)]
    pub unresolved: Vec<UnresolvedHolding>,
}
