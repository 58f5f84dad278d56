//! Split schedule derived from price bars.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::model::{PriceBar, SplitEvent};

/// Split ratios per symbol, ordered by effective date.
#[derive(Debug, Clone, Default)]
pub struct SplitSchedule {
    splits: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl SplitSchedule {
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        let mut schedule = Self::default();
        for bar in bars {
            if let Some(ratio) = bar.split_ratio {
                schedule.add(&bar.symbol, bar.date, ratio);
            }
        }
        schedule
    }

    /// Registers a split. Non-positive ratios are ignored.
    pub fn add(&mut self, symbol: &str, date: NaiveDate, ratio: Decimal) {
        if ratio <= Decimal::ZERO {
            warn!(
                "Ignoring non-positive split ratio {} for {} on {}",
                ratio, symbol, date
            );
            return;
        }
        if ratio == Decimal::ONE {
            return;
        }
        self.splits
            .entry(symbol.to_string())
            .or_default()
            .insert(date, ratio);
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Cumulative ratio of the splits effective in `(after, through]`.
    ///
    /// Multiplying a quantity held on `after` by this factor expresses it in
    /// share counts as of `through`.
    pub fn factor_between(&self, symbol: &str, after: NaiveDate, through: NaiveDate) -> Decimal {
        if after >= through {
            return Decimal::ONE;
        }
        let Some(history) = self.splits.get(symbol) else {
            return Decimal::ONE;
        };
        history
            .range(after..=through)
            .filter(|(date, _)| **date > after)
            .fold(Decimal::ONE, |acc, (_, ratio)| acc * *ratio)
    }

    /// All registered splits, ordered by symbol then date.
    pub fn events(&self) -> Vec<SplitEvent> {
        let mut events: Vec<SplitEvent> = self
            .splits
            .iter()
            .flat_map(|(symbol, history)| {
                history.iter().map(move |(date, ratio)| SplitEvent {
                    symbol: symbol.clone(),
                    date: *date,
                    ratio: *ratio,
                })
            })
            .collect();
        events.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.date.cmp(&b.date)));
        events
    }
}
