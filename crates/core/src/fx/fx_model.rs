use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily exchange rate: one unit of `base_currency` buys `rate` units of
/// `quote_currency` on `date`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FxRate {
    pub base_currency: String,
    pub quote_currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl FxRate {
    pub fn new(base_currency: &str, quote_currency: &str, date: NaiveDate, rate: Decimal) -> Self {
        Self {
            base_currency: base_currency.to_string(),
            quote_currency: quote_currency.to_string(),
            date,
            rate,
        }
    }

    /// Creates a display key for a currency pair.
    /// Returns format: "FX:EUR/USD"
    pub fn make_pair_key(from: &str, to: &str) -> String {
        format!("FX:{}/{}", from, to)
    }
}
