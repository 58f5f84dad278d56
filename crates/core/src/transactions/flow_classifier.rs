//! Flow classification for performance calculation.
//!
//! Only external flows (money crossing the portfolio boundary) enter the
//! time- and money-weighted cash-flow sets.

use serde::{Deserialize, Serialize};

use super::{Transaction, TransactionKind};
use crate::settings::DividendTreatment;

/// Flow type for performance calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    /// External flow - money crossing portfolio boundary
    /// Counts as contribution/withdrawal
    External,

    /// Internal flow - money moving within portfolio
    Internal,
}

/// Classify a transaction's flow.
///
/// External flows:
/// - DEPOSIT, WITHDRAWAL
/// - DIVIDEND when dividends are paid out to the investor
///
/// Internal flows:
/// - BUY, SELL (asset reallocation)
/// - FEE (deduction from existing money)
/// - DIVIDEND when reinvested
pub fn classify_flow(transaction: &Transaction, dividends: DividendTreatment) -> FlowType {
    match transaction.kind {
        TransactionKind::Deposit | TransactionKind::Withdrawal => FlowType::External,
        TransactionKind::Dividend => match dividends {
            DividendTreatment::External => FlowType::External,
            DividendTreatment::Reinvest => FlowType::Internal,
        },
        TransactionKind::Buy | TransactionKind::Sell | TransactionKind::Fee => FlowType::Internal,
    }
}

/// Check if a transaction is an external flow
pub fn is_external_flow(transaction: &Transaction, dividends: DividendTreatment) -> bool {
    classify_flow(transaction, dividends) == FlowType::External
}
