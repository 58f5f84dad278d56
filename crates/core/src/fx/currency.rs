//! Currency code recognition and minor-unit normalization.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct CurrencyNormalizationRule {
    pub major_code: &'static str,
    pub factor: Decimal,
    pub label: &'static str,
}

static CURRENCY_RULES: OnceLock<HashMap<&'static str, CurrencyNormalizationRule>> = OnceLock::new();

static ISO_CODES: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Active ISO-4217 codes plus the precious metals commonly quoted as currencies.
const ISO_4217: &[&str] = &[
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT",
    "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYN", "BZD", "CAD",
    "CDF", "CHF", "CLP", "CNY", "COP", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD",
    "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ",
    "GYD", "HKD", "HNL", "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD",
    "JPY", "KES", "KGS", "KHR", "KMF", "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR",
    "LRD", "LSL", "LYD", "MAD", "MDL", "MGA", "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR",
    "MWK", "MXN", "MYR", "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", "PAB", "PEN",
    "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB", "RWF", "SAR", "SBD", "SCR",
    "SDG", "SEK", "SGD", "SHP", "SLE", "SOS", "SRD", "SSP", "STN", "SVC", "SYP", "SZL", "THB",
    "TJS", "TMT", "TND", "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "UYU", "UZS",
    "VES", "VND", "VUV", "WST", "XAF", "XAG", "XAU", "XCD", "XOF", "XPF", "YER", "ZAR", "ZMW",
    "ZWL",
];

fn get_rules() -> &'static HashMap<&'static str, CurrencyNormalizationRule> {
    CURRENCY_RULES.get_or_init(|| {
        let pence = CurrencyNormalizationRule {
            major_code: "GBP",
            factor: dec!(0.01),
            label: "Pence",
        };
        let sa_cents = CurrencyNormalizationRule {
            major_code: "ZAR",
            factor: dec!(0.01),
            label: "SA Cents",
        };

        let mut map = HashMap::new();
        map.insert("GBp", pence.clone());
        map.insert("GBX", pence);
        map.insert("ZAc", sa_cents.clone());
        map.insert("ZAC", sa_cents);
        map.insert(
            "ILA",
            CurrencyNormalizationRule {
                major_code: "ILS",
                factor: dec!(0.01),
                label: "Agorot",
            },
        );
        map
    })
}

/// Returns the normalization rule for a given currency code, if one exists.
pub fn get_normalization_rule(code: &str) -> Option<&'static CurrencyNormalizationRule> {
    get_rules().get(code)
}

/// True for ISO-4217 codes and for minor-unit codes with a normalization rule.
pub fn is_known_currency(code: &str) -> bool {
    if get_normalization_rule(code).is_some() {
        return true;
    }
    ISO_CODES
        .get_or_init(|| ISO_4217.iter().copied().collect())
        .contains(code)
}

/// Returns the major currency code for FX lookups without touching the amount.
pub fn normalize_currency_code(currency: &str) -> &str {
    get_normalization_rule(currency).map_or(currency, |rule| rule.major_code)
}

/// Multiplier that turns a major-unit amount back into the requested minor unit.
pub fn denormalization_multiplier(currency: &str) -> Decimal {
    get_normalization_rule(currency).map_or(Decimal::ONE, |rule| Decimal::ONE / rule.factor)
}
