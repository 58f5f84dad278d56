//! Aggregation of holdings into a weighted portfolio structure.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::constants::CASH_SYMBOL_PREFIX;
use crate::errors::Result;
use crate::fx::CurrencyConverter;
use crate::portfolio::holdings::PortfolioState;
use crate::quotes::PriceResolver;

use super::{StructureItem, StructureResponse, UnresolvedHolding};

/// Computes per-holding values and weights in base currency.
pub struct AllocationCalculator<'a> {
    prices: &'a PriceResolver,
    fx: &'a CurrencyConverter,
    base_currency: &'a str,
    include_cash: bool,
}

impl<'a> AllocationCalculator<'a> {
    pub fn new(
        prices: &'a PriceResolver,
        fx: &'a CurrencyConverter,
        base_currency: &'a str,
        include_cash: bool,
    ) -> Self {
        Self {
            prices,
            fx,
            base_currency,
            include_cash,
        }
    }

    /// Prices one position: (unit price in base, stale).
    fn price_position(
        &self,
        symbol: &str,
        currency: &str,
        as_of: NaiveDate,
    ) -> Result<(Decimal, bool)> {
        let resolved = self.prices.price_as_of(symbol, as_of)?;
        let price = self
            .fx
            .convert(resolved.price, currency, self.base_currency, as_of)?;
        Ok((price, resolved.stale))
    }

    pub fn compute(&self, state: &PortfolioState, as_of: NaiveDate) -> StructureResponse {
        let mut items: Vec<StructureItem> = Vec::new();
        let mut unresolved: Vec<UnresolvedHolding> = Vec::new();

        for (symbol, holding) in &state.positions {
            if holding.quantity.is_zero() {
                continue;
            }
            match self.price_position(symbol, &holding.currency, as_of) {
                Ok((price, stale)) => items.push(StructureItem {
                    symbol: symbol.clone(),
                    quantity: holding.quantity,
                    price,
                    currency: holding.currency.clone(),
                    value: holding.quantity * price,
                    weight: Decimal::ZERO,
                    stale,
                }),
                Err(e) => {
                    warn!("Excluding {} from structure on {}: {}", symbol, as_of, e);
                    unresolved.push(UnresolvedHolding {
                        symbol: symbol.clone(),
                        quantity: holding.quantity,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.include_cash {
            for (currency, balance) in &state.cash_balances {
                if balance.is_zero() {
                    continue;
                }
                let symbol = format!("{}{}", CASH_SYMBOL_PREFIX, currency);
                match self.fx.rate(currency, self.base_currency, as_of) {
                    Ok(rate) => items.push(StructureItem {
                        symbol,
                        quantity: *balance,
                        price: rate,
                        currency: currency.clone(),
                        value: *balance * rate,
                        weight: Decimal::ZERO,
                        stale: false,
                    }),
                    Err(e) => {
                        warn!("Excluding {} from structure on {}: {}", symbol, as_of, e);
                        unresolved.push(UnresolvedHolding {
                            symbol,
                            quantity: *balance,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        let total_value: Decimal = items.iter().map(|item| item.value).sum();

        if total_value.is_zero() {
            debug!("Structure on {} has zero total value", as_of);
            items.clear();
        } else {
            for item in items.iter_mut() {
                item.weight = item.value / total_value;
            }
        }

        items.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.symbol.cmp(&b.symbol)));

        StructureResponse {
            as_of,
            currency: self.base_currency.to_string(),
            total_value,
            items,
            unresolved,
        }
    }
}
