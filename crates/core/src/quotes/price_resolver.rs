use chrono::{Duration, NaiveDate};
use dashmap::DashMap;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::errors::PriceError;
use super::model::{PriceBar, ResolvedPrice};
use super::splits::SplitSchedule;

type PriceKey = (String, NaiveDate);

/// Resolves the close of a symbol as of a date.
///
/// Closes are as-traded; every resolved price is divided by the splits that
/// happened after its bar and up to `adjust_to`, so that it can be multiplied
/// with quantities normalized to the same date. Lookups never look past the
/// requested date.
pub struct PriceResolver {
    closes: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
    splits: SplitSchedule,
    staleness_days: i64,
    adjust_to: NaiveDate,
    resolved: DashMap<PriceKey, Result<ResolvedPrice, PriceError>>,
}

impl PriceResolver {
    pub fn new(bars: &[PriceBar], staleness_days: i64, adjust_to: NaiveDate) -> Self {
        let mut closes: HashMap<String, BTreeMap<NaiveDate, Decimal>> = HashMap::new();
        for bar in bars {
            if bar.close < Decimal::ZERO {
                warn!(
                    "Ignoring negative close {} for {} on {}",
                    bar.close, bar.symbol, bar.date
                );
                continue;
            }
            closes
                .entry(bar.symbol.clone())
                .or_default()
                .insert(bar.date, bar.close);
        }

        Self {
            closes,
            splits: SplitSchedule::from_bars(bars),
            staleness_days,
            adjust_to,
            resolved: DashMap::new(),
        }
    }

    /// Split events known to this resolver.
    pub fn splits(&self) -> &SplitSchedule {
        &self.splits
    }

    pub fn adjust_to(&self) -> NaiveDate {
        self.adjust_to
    }

    pub fn price_as_of(&self, symbol: &str, date: NaiveDate) -> Result<ResolvedPrice, PriceError> {
        let key = (symbol.to_string(), date);
        if let Some(hit) = self.resolved.get(&key) {
            return hit.value().clone();
        }

        let result = self.lookup(symbol, date);
        if let Ok(resolved) = &result {
            if resolved.stale {
                warn!(
                    "Using stale close for {} on {} from {}",
                    symbol, date, resolved.date
                );
            }
        }
        self.resolved.insert(key, result.clone());
        result
    }

    fn lookup(&self, symbol: &str, date: NaiveDate) -> Result<ResolvedPrice, PriceError> {
        let window_start = date
            .checked_sub_signed(Duration::try_days(self.staleness_days).unwrap_or(Duration::MAX))
            .unwrap_or(NaiveDate::MIN);

        let found = self
            .closes
            .get(symbol)
            .and_then(|history| history.range(window_start..=date).next_back());

        match found {
            Some((bar_date, close)) => {
                let factor = self.splits.factor_between(symbol, *bar_date, self.adjust_to);
                debug!(
                    "Resolved {} on {} from bar {} (split factor {})",
                    symbol, date, bar_date, factor
                );
                Ok(ResolvedPrice {
                    price: *close / factor,
                    date: *bar_date,
                    stale: *bar_date < date,
                })
            }
            None => Err(PriceError::Unavailable {
                symbol: symbol.to_string(),
                date,
                staleness_days: self.staleness_days,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bars() -> Vec<PriceBar> {
        vec![
            PriceBar::new("AAPL", date(2024, 1, 2), dec!(180)),
            PriceBar::new("AAPL", date(2024, 1, 5), dec!(185)),
            PriceBar::new("AAPL", date(2024, 1, 8), dec!(190)).with_dividend(dec!(0.24)),
        ]
    }

    #[test]
    fn test_exact_date_is_fresh() {
        let resolver = PriceResolver::new(&bars(), 10, date(2024, 12, 31));
        let resolved = resolver.price_as_of("AAPL", date(2024, 1, 5)).unwrap();
        assert_eq!(
            resolved,
            ResolvedPrice {
                price: dec!(185),
                date: date(2024, 1, 5),
                stale: false
            }
        );
    }

    #[test]
    fn test_prior_close_is_flagged_stale() {
        let resolver = PriceResolver::new(&bars(), 10, date(2024, 12, 31));
        let resolved = resolver.price_as_of("AAPL", date(2024, 1, 7)).unwrap();
        assert_eq!(resolved.price, dec!(185));
        assert_eq!(resolved.date, date(2024, 1, 5));
        assert!(resolved.stale);
    }

    #[test]
    fn test_beyond_staleness_fails() {
        let resolver = PriceResolver::new(&bars(), 10, date(2024, 12, 31));

        assert!(resolver.price_as_of("AAPL", date(2024, 1, 18)).is_ok());
        assert_eq!(
            resolver.price_as_of("AAPL", date(2024, 1, 19)),
            Err(PriceError::Unavailable {
                symbol: "AAPL".to_string(),
                date: date(2024, 1, 19),
                staleness_days: 10,
            })
        );
    }

    #[test]
    fn test_unbounded_staleness_does_not_overflow() {
        let resolver = PriceResolver::new(&bars(), i64::MAX, date(2024, 12, 31));
        let resolved = resolver.price_as_of("AAPL", date(2024, 12, 31)).unwrap();
        assert_eq!(resolved.price, dec!(190));
        assert!(resolved.stale);
    }

    #[test]
    fn test_never_uses_later_close() {
        let resolver = PriceResolver::new(&bars(), 10, date(2024, 12, 31));
        assert!(resolver.price_as_of("AAPL", date(2024, 1, 1)).is_err());
        assert!(resolver.price_as_of("MSFT", date(2024, 1, 5)).is_err());
    }

    #[test]
    fn test_pre_split_closes_are_adjusted() {
        let bars = vec![
            PriceBar::new("NVDA", date(2024, 6, 7), dec!(1200)),
            PriceBar::new("NVDA", date(2024, 6, 10), dec!(121)).with_split(dec!(10)),
        ];

        let after_split = PriceResolver::new(&bars, 10, date(2024, 6, 30));
        assert_eq!(
            after_split.price_as_of("NVDA", date(2024, 6, 7)).unwrap().price,
            dec!(120)
        );
        assert_eq!(
            after_split.price_as_of("NVDA", date(2024, 6, 10)).unwrap().price,
            dec!(121)
        );

        // Before the split takes effect nothing is adjusted.
        let before_split = PriceResolver::new(&bars, 10, date(2024, 6, 9));
        assert_eq!(
            before_split.price_as_of("NVDA", date(2024, 6, 7)).unwrap().price,
            dec!(1200)
        );
    }

    #[test]
    fn test_negative_closes_are_skipped() {
        let bars = vec![
            PriceBar::new("XYZ", date(2024, 1, 2), dec!(10)),
            PriceBar::new("XYZ", date(2024, 1, 3), dec!(-1)),
        ];
        let resolver = PriceResolver::new(&bars, 10, date(2024, 12, 31));
        let resolved = resolver.price_as_of("XYZ", date(2024, 1, 3)).unwrap();
        assert_eq!(resolved.price, dec!(10));
        assert!(resolved.stale);
    }

    #[test]
    fn test_failed_lookups_are_cached() {
        let resolver = PriceResolver::new(&bars(), 10, date(2024, 12, 31));
        let first = resolver.price_as_of("MSFT", date(2024, 1, 5));
        let second = resolver.price_as_of("MSFT", date(2024, 1, 5));
        assert_eq!(first, second);
        assert_eq!(resolver.resolved.len(), 1);
    }
}
