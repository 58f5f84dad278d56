use crate::fx::currency::{denormalization_multiplier, normalize_currency_code};
use crate::fx::fx_errors::FxError;
use crate::fx::fx_model::FxRate;
use chrono::{Duration, NaiveDate};
use dashmap::DashMap;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// (from, to, date) in major currency codes
type ResolvedKey = (String, String, NaiveDate);

/// Converts amounts between currencies using daily rates of the direct pair.
///
/// Rates are stored as one time series per pair. A lookup takes the rate on
/// the requested date or, failing that, the most recent earlier rate inside
/// the tolerance window. Later rates are never used: a valuation on date `d`
/// must only see information available on `d`.
///
/// A converter is built per computation and memoizes resolved lookups for its
/// own lifetime only.
pub struct CurrencyConverter {
    /// Key: (From_Currency, To_Currency), major codes
    /// Value: BTreeMap<Date, Rate>
    rates: HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>,
    tolerance_days: i64,
    allow_inverse: bool,
    resolved: DashMap<ResolvedKey, Option<Decimal>>,
}

impl CurrencyConverter {
    /// Creates a new `CurrencyConverter` from a slice of daily rates.
    pub fn new(rates: &[FxRate], tolerance_days: i64) -> Self {
        let mut converter = CurrencyConverter {
            rates: HashMap::new(),
            tolerance_days,
            allow_inverse: false,
            resolved: DashMap::new(),
        };
        converter.add_rates(rates);
        converter
    }

    /// Allows `1 / rate(to, from)` when the direct pair has no usable rate.
    pub fn with_inverse_rates(mut self, allow_inverse: bool) -> Self {
        self.allow_inverse = allow_inverse;
        self
    }

    pub fn tolerance_days(&self) -> i64 {
        self.tolerance_days
    }

    fn add_rates(&mut self, rates: &[FxRate]) {
        for rate in rates {
            let from = normalize_currency_code(&rate.base_currency);
            let to = normalize_currency_code(&rate.quote_currency);
            if from == to {
                continue;
            }
            if rate.rate <= Decimal::ZERO {
                warn!(
                    "Ignoring non-positive rate {} for {} on {}",
                    rate.rate,
                    FxRate::make_pair_key(&rate.base_currency, &rate.quote_currency),
                    rate.date
                );
                continue;
            }

            // A rate quoted against minor units is restated in major units.
            let major_rate = rate.rate * denormalization_multiplier(&rate.base_currency)
                / denormalization_multiplier(&rate.quote_currency);

            let previous = self
                .rates
                .entry((from.to_string(), to.to_string()))
                .or_default()
                .insert(rate.date, major_rate);
            if previous.is_some() {
                warn!(
                    "Duplicate rate for {} on {}; keeping the last one",
                    FxRate::make_pair_key(from, to),
                    rate.date
                );
            }
        }
    }

    /// Latest rate of the (from, to) series within [date - tolerance, date].
    fn lookup_pair(&self, from: &str, to: &str, date: NaiveDate) -> Option<Decimal> {
        let history = self.rates.get(&(from.to_string(), to.to_string()))?;
        let window_start = date
            .checked_sub_signed(Duration::try_days(self.tolerance_days).unwrap_or(Duration::MAX))
            .unwrap_or(NaiveDate::MIN);
        history
            .range(window_start..=date)
            .next_back()
            .map(|(_, rate)| *rate)
    }

    fn resolve(&self, from: &str, to: &str, date: NaiveDate) -> Option<Decimal> {
        let key = (from.to_string(), to.to_string(), date);
        if let Some(hit) = self.resolved.get(&key) {
            debug!("FX cache HIT for {} on {}", FxRate::make_pair_key(from, to), date);
            return *hit.value();
        }

        let rate = self.lookup_pair(from, to, date).or_else(|| {
            if self.allow_inverse {
                self.lookup_pair(to, from, date)
                    .map(|inverse| Decimal::ONE / inverse)
            } else {
                None
            }
        });
        debug!(
            "FX cache MISS for {} on {}: {:?}",
            FxRate::make_pair_key(from, to),
            date,
            rate
        );
        self.resolved.insert(key, rate);
        rate
    }

    /// Rate that turns one unit of `from_currency` into `to_currency` on `date`.
    pub fn rate(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        if from_currency == to_currency {
            return Ok(Decimal::ONE);
        }

        let from_major = normalize_currency_code(from_currency);
        let to_major = normalize_currency_code(to_currency);
        let unit_factor =
            denormalization_multiplier(to_currency) / denormalization_multiplier(from_currency);

        if from_major == to_major {
            return Ok(unit_factor);
        }

        match self.resolve(from_major, to_major, date) {
            Some(rate) => Ok(rate * unit_factor),
            None => Err(FxError::RateUnavailable {
                from: from_currency.to_string(),
                to: to_currency.to_string(),
                date,
                tolerance_days: self.tolerance_days,
            }),
        }
    }

    /// Converts `amount` from `from_currency` into `to_currency` on `date`.
    /// Identical currencies return the amount unchanged without a lookup.
    pub fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        if from_currency == to_currency {
            return Ok(amount);
        }
        Ok(amount * self.rate(from_currency, to_currency, date)?)
    }
}
