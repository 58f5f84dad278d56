use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FX_TOLERANCE_DAYS, DEFAULT_PRICE_STALENESS_DAYS, MAX_LOOKBACK_DAYS};
use crate::errors::ValidationError;

/// How dividend transactions affect the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DividendTreatment {
    /// Cash stays in the portfolio; the dividend is an internal flow.
    #[default]
    Reinvest,
    /// Cash is paid out to the investor; the dividend is an external outflow.
    External,
}

/// Whether sells may take a position below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShortPositions {
    #[default]
    Reject,
    Allow,
}

/// What a time-weighted chain does with a sub-period whose return is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedSubPeriods {
    /// The whole chain becomes undefined.
    #[default]
    Propagate,
    /// The sub-period is dropped from the chain and reported. A sub-period
    /// that could not be valued still breaks the chain.
    Exclude,
}

fn default_fx_tolerance_days() -> i64 {
    DEFAULT_FX_TOLERANCE_DAYS
}

fn default_price_staleness_days() -> i64 {
    DEFAULT_PRICE_STALENESS_DAYS
}

/// Engine-wide settings. Every field has a default, so `{}` is a valid document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default = "default_fx_tolerance_days")]
    pub fx_tolerance_days: i64,
    #[serde(default = "default_price_staleness_days")]
    pub price_staleness_days: i64,
    #[serde(default)]
    pub dividend_treatment: DividendTreatment,
    #[serde(default)]
    pub short_positions: ShortPositions,
    #[serde(default)]
    pub undefined_sub_periods: UndefinedSubPeriods,
    #[serde(default)]
    pub allow_inverse_rates: bool,
    #[serde(default)]
    pub include_cash_in_structure: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fx_tolerance_days: DEFAULT_FX_TOLERANCE_DAYS,
            price_staleness_days: DEFAULT_PRICE_STALENESS_DAYS,
            dividend_treatment: DividendTreatment::default(),
            short_positions: ShortPositions::default(),
            undefined_sub_periods: UndefinedSubPeriods::default(),
            allow_inverse_rates: false,
            include_cash_in_structure: false,
        }
    }
}

fn check_lookback(name: &str, days: i64) -> Result<(), ValidationError> {
    if !(0..=MAX_LOOKBACK_DAYS).contains(&days) {
        return Err(ValidationError::InvalidInput(format!(
            "{} must be between 0 and {}, got {}",
            name, MAX_LOOKBACK_DAYS, days
        )));
    }
    Ok(())
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_lookback("fxToleranceDays", self.fx_tolerance_days)?;
        check_lookback("priceStalenessDays", self.price_staleness_days)
    }
}
