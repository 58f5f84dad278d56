//! External cash flows of a portfolio over a period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::errors::Result;
use crate::fx::CurrencyConverter;
use crate::settings::DividendTreatment;
use crate::transactions::{is_external_flow, FlowType, Transaction, TransactionKind};

use super::{CashFlow, Period};

/// Signed amount, in the transaction currency, that an external transaction
/// moves across the portfolio boundary. `None` for internal transactions.
pub fn external_flow_amount(tx: &Transaction, dividends: DividendTreatment) -> Option<Decimal> {
    if !is_external_flow(tx, dividends) {
        return None;
    }
    let gross = tx.gross_amount();
    let fee = tx.fee_amount();
    match tx.kind {
        TransactionKind::Deposit => Some(gross - fee),
        TransactionKind::Withdrawal => Some(-(gross + fee)),
        // Paid out to the investor: value leaves the portfolio.
        TransactionKind::Dividend => Some(-(gross - fee)),
        TransactionKind::Buy | TransactionKind::Sell | TransactionKind::Fee => None,
    }
}

/// Derives the external cash flows of a period in base currency.
pub struct CashFlowExtractor<'a> {
    fx: &'a CurrencyConverter,
    base_currency: &'a str,
    dividends: DividendTreatment,
}

impl<'a> CashFlowExtractor<'a> {
    pub fn new(fx: &'a CurrencyConverter, base_currency: &'a str, dividends: DividendTreatment) -> Self {
        Self {
            fx,
            base_currency,
            dividends,
        }
    }

    /// Flows dated within `period`, converted at their own dates and sorted
    /// ascending by date. Same-day flows are kept separate, in input order.
    pub fn extract(&self, transactions: &[Transaction], period: &Period) -> Result<Vec<CashFlow>> {
        let mut flows = Vec::new();
        for tx in transactions.iter().filter(|tx| period.contains(tx.occurred_at)) {
            let Some(local_amount) = external_flow_amount(tx, self.dividends) else {
                continue;
            };
            let amount = self
                .fx
                .convert(local_amount, &tx.currency, self.base_currency, tx.occurred_at)?;
            flows.push(CashFlow {
                date: tx.occurred_at,
                amount,
                kind: FlowType::External,
                source: tx.kind,
                currency: tx.currency.clone(),
                transaction_id: tx.id.clone(),
            });
        }
        flows.sort_by_key(|flow| flow.date);
        Ok(flows)
    }
}

/// Net of all flows dated `date`.
pub fn net_flow_on(flows: &[CashFlow], date: NaiveDate) -> Decimal {
    flows
        .iter()
        .filter(|flow| flow.date == date)
        .map(|flow| flow.amount)
        .sum()
}

/// Net flow per date, for dates that have at least one flow.
pub fn net_flows_by_date(flows: &[CashFlow]) -> BTreeMap<NaiveDate, Decimal> {
    let mut net: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for flow in flows {
        *net.entry(flow.date).or_insert(Decimal::ZERO) += flow.amount;
    }
    net
}
