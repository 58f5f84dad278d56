use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal precision for returns and monetary totals in responses
pub const DECIMAL_PRECISION: u32 = 6;

/// Default backward scan window for FX rates, in calendar days
pub const DEFAULT_FX_TOLERANCE_DAYS: i64 = 5;

/// Default maximum age of a close price, in calendar days
pub const DEFAULT_PRICE_STALENESS_DAYS: i64 = 10;

/// Upper bound accepted for either lookback window, in calendar days
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Allowed deviation of the allocation weight sum from one
pub const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.000000001);

/// Prefix of synthetic structure items representing cash balances
pub const CASH_SYMBOL_PREFIX: &str = "CASH:";

/// Average calendar days per year, used for annualization
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);
