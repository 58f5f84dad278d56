//! FX (Foreign Exchange) module - rate models, currency codes and conversion.

pub mod currency;
pub mod currency_converter;
mod fx_errors;
mod fx_model;

pub use currency::{
    denormalization_multiplier, get_normalization_rule, is_known_currency, normalize_currency_code,
};
pub use currency_converter::CurrencyConverter;
pub use fx_errors::FxError;
pub use fx_model::FxRate;
