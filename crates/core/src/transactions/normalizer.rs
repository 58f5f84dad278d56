//! Validation, ordering and split adjustment of raw transactions.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::{Transaction, TransactionError};
use crate::fx::is_known_currency;
use crate::quotes::SplitSchedule;

/// Rejects a single malformed record.
pub fn validate_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.quantity.is_zero() {
        return Err(TransactionError::ZeroQuantity { id: tx.id.clone() });
    }
    if tx.price < Decimal::ZERO {
        return Err(TransactionError::NegativePrice {
            id: tx.id.clone(),
            price: tx.price,
        });
    }
    if let Some(fee) = tx.fees {
        if fee < Decimal::ZERO {
            return Err(TransactionError::NegativeFee {
                id: tx.id.clone(),
                fee,
            });
        }
    }
    if !is_known_currency(&tx.currency) {
        return Err(TransactionError::UnrecognizedCurrency {
            id: tx.id.clone(),
            currency: tx.currency.clone(),
        });
    }
    if tx.kind.requires_symbol() && tx.symbol.as_deref().map_or(true, |s| s.trim().is_empty()) {
        return Err(TransactionError::MissingSymbol {
            id: tx.id.clone(),
            kind: tx.kind.to_string(),
        });
    }
    Ok(())
}

/// Trades of one symbol must all be in the same currency.
fn check_holding_currencies(transactions: &[Transaction]) -> Result<(), TransactionError> {
    let mut currencies: HashMap<&str, &str> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.kind.is_trade()) {
        let symbol = tx.symbol_str();
        let expected = *currencies.entry(symbol).or_insert(tx.currency.as_str());
        if expected != tx.currency {
            return Err(TransactionError::CurrencyMismatch {
                id: tx.id.clone(),
                symbol: symbol.to_string(),
                expected: expected.to_string(),
                actual: tx.currency.clone(),
            });
        }
    }
    Ok(())
}

/// Returns the transactions sorted chronologically and expressed in share
/// counts as of `adjust_to`.
///
/// Every record is validated before anything else happens. Records sharing a
/// date are ordered by kind rank and keep their input order within a rank.
/// A split effective after the transaction date and on or before `adjust_to`
/// multiplies the quantity and divides the price by its ratio, which leaves
/// the gross amount unchanged.
pub fn normalize(
    raw: &[Transaction],
    splits: &SplitSchedule,
    adjust_to: NaiveDate,
) -> Result<Vec<Transaction>, TransactionError> {
    for tx in raw {
        validate_transaction(tx)?;
    }

    let mut ordered: Vec<Transaction> = raw.to_vec();
    // Stable sort keeps input order as the final tie-break.
    ordered.sort_by_key(|tx| (tx.occurred_at, tx.kind.sort_rank()));

    check_holding_currencies(&ordered)?;

    if !splits.is_empty() {
        for tx in ordered.iter_mut() {
            let Some(symbol) = tx.symbol.as_deref() else {
                continue;
            };
            if !tx.kind.requires_symbol() {
                continue;
            }
            let factor = splits.factor_between(symbol, tx.occurred_at, adjust_to);
            if factor != Decimal::ONE {
                debug!(
                    "Split-adjusting transaction {} ({} on {}) by {}",
                    tx.id, symbol, tx.occurred_at, factor
                );
                tx.quantity *= factor;
                tx.price /= factor;
            }
        }
    }

    Ok(ordered)
}
