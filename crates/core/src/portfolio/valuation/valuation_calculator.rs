use crate::errors::Result;
use crate::fx::CurrencyConverter;
use crate::portfolio::holdings::{HoldingsCalculator, PortfolioState, ValuationPoint};
use crate::portfolio::valuation::PortfolioValuer;
use crate::quotes::PriceResolver;
use crate::transactions::Transaction;

use chrono::NaiveDate;
use dashmap::DashMap;
use log::{debug, warn};
use rayon::prelude::*;
use rust_decimal::Decimal;

/// Market value of a state on `date`, in `base_currency`.
///
/// Every nonzero position is priced and converted; cash balances are
/// converted. The first missing price or rate fails the whole valuation.
pub fn calculate_state_value(
    state: &PortfolioState,
    date: NaiveDate,
    base_currency: &str,
    prices: &PriceResolver,
    fx: &CurrencyConverter,
) -> Result<Decimal> {
    let mut total = Decimal::ZERO;

    for (symbol, holding) in &state.positions {
        if holding.quantity.is_zero() {
            continue;
        }
        let resolved = prices.price_as_of(symbol, date)?;
        let local_value = holding.quantity * resolved.price;
        total += fx.convert(local_value, &holding.currency, base_currency, date)?;
    }

    for (currency, balance) in &state.cash_balances {
        if balance.is_zero() {
            continue;
        }
        total += fx.convert(*balance, currency, base_currency, date)?;
    }

    Ok(total)
}

/// Values the portfolio from normalized transactions and market data.
///
/// Holds no state beyond a memo of computed points, which lives as long as
/// the valuer itself.
pub struct MarketValuer<'a> {
    transactions: &'a [Transaction],
    calculator: HoldingsCalculator,
    prices: &'a PriceResolver,
    fx: &'a CurrencyConverter,
    base_currency: String,
    memo: DashMap<ValuationPoint, Result<Decimal>>,
}

impl<'a> MarketValuer<'a> {
    pub fn new(
        transactions: &'a [Transaction],
        calculator: HoldingsCalculator,
        prices: &'a PriceResolver,
        fx: &'a CurrencyConverter,
        base_currency: &str,
    ) -> Self {
        Self {
            transactions,
            calculator,
            prices,
            fx,
            base_currency: base_currency.to_string(),
            memo: DashMap::new(),
        }
    }

    fn compute(&self, point: ValuationPoint) -> Result<Decimal> {
        let state = self.calculator.snapshot(self.transactions, point)?;
        calculate_state_value(&state, point.date, &self.base_currency, self.prices, self.fx)
    }
}

impl PortfolioValuer for MarketValuer<'_> {
    fn value_at(&self, point: ValuationPoint) -> Result<Decimal> {
        if let Some(hit) = self.memo.get(&point) {
            return hit.value().clone();
        }
        let value = self.compute(point);
        debug!("Valued portfolio at {}: {:?}", point, value);
        self.memo.insert(point, value.clone());
        value
    }

    /// Replays the transactions once for all unvalued points, then prices
    /// the states in parallel. Results come back in input order.
    fn value_points(&self, points: &[ValuationPoint]) -> Vec<(ValuationPoint, Result<Decimal>)> {
        let mut pending: Vec<ValuationPoint> = points
            .iter()
            .copied()
            .filter(|point| !self.memo.contains_key(point))
            .collect();
        pending.sort();
        pending.dedup();

        match self.calculator.snapshots(self.transactions, &pending) {
            Ok(states) => states.par_iter().for_each(|(point, state)| {
                let value = calculate_state_value(
                    state,
                    point.date,
                    &self.base_currency,
                    self.prices,
                    self.fx,
                );
                debug!("Valued portfolio at {}: {:?}", point, value);
                self.memo.insert(*point, value);
            }),
            Err(e) => warn!("Batch replay failed, valuing points one by one: {}", e),
        }

        points
            .par_iter()
            .map(|point| (*point, self.value_at(*point)))
            .collect()
    }
}
