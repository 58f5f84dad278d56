use anyhow::{Context, Result};
use perfolio_core::settings::EngineSettings;
use serde::de::DeserializeOwned;

/// Runtime configuration read from `PERFOLIO_*` variables.
pub struct Config {
    pub settings: EngineSettings,
    pub log_format: String,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_number(name: &str, default: i64) -> Result<i64> {
    match env_var(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", name, raw)),
        None => Ok(default),
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
    match env_var(name).as_deref() {
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => anyhow::bail!("Invalid {}: '{}'", name, other),
        None => Ok(default),
    }
}

/// Parses a lowercase enum value the way the request documents spell it.
fn env_choice<T: DeserializeOwned>(name: &str, default: T) -> Result<T> {
    match env_var(name) {
        Some(raw) => serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
            .with_context(|| format!("Invalid {}: '{}'", name, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = EngineSettings::default();
        let settings = EngineSettings {
            fx_tolerance_days: env_number("PERFOLIO_FX_TOLERANCE_DAYS", defaults.fx_tolerance_days)?,
            price_staleness_days: env_number(
                "PERFOLIO_PRICE_STALENESS_DAYS",
                defaults.price_staleness_days,
            )?,
            dividend_treatment: env_choice(
                "PERFOLIO_DIVIDEND_TREATMENT",
                defaults.dividend_treatment,
            )?,
            short_positions: env_choice("PERFOLIO_SHORT_POSITIONS", defaults.short_positions)?,
            undefined_sub_periods: env_choice(
                "PERFOLIO_UNDEFINED_SUB_PERIODS",
                defaults.undefined_sub_periods,
            )?,
            allow_inverse_rates: env_flag(
                "PERFOLIO_ALLOW_INVERSE_RATES",
                defaults.allow_inverse_rates,
            )?,
            include_cash_in_structure: env_flag(
                "PERFOLIO_INCLUDE_CASH",
                defaults.include_cash_in_structure,
            )?,
        };
        let log_format = env_var("PERFOLIO_LOG_FORMAT").unwrap_or_else(|| "text".to_string());
        Ok(Self {
            settings,
            log_format,
        })
    }
}
