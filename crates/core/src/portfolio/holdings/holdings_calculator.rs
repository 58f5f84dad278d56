use crate::portfolio::holdings::{Holding, PortfolioState, SnapshotPhase, ValuationPoint};
use crate::settings::{DividendTreatment, ShortPositions};
use crate::transactions::{is_external_flow, Transaction, TransactionError, TransactionKind};

use log::debug;
use rust_decimal::Decimal;

/// Helper function for cash mutations.
/// Books cash in the transaction currency.
#[inline]
fn add_cash(state: &mut PortfolioState, currency: &str, delta: Decimal) {
    *state
        .cash_balances
        .entry(currency.to_string())
        .or_insert(Decimal::ZERO) += delta;
}

/// Replays normalized transactions into positions and cash balances.
/// It does not price anything.
#[derive(Debug, Clone, Copy)]
pub struct HoldingsCalculator {
    dividends: DividendTreatment,
    shorts: ShortPositions,
}

impl HoldingsCalculator {
    pub fn new(dividends: DividendTreatment, shorts: ShortPositions) -> Self {
        Self { dividends, shorts }
    }

    pub fn dividend_treatment(&self) -> DividendTreatment {
        self.dividends
    }

    /// Applies a single transaction to `state`.
    pub fn apply(
        &self,
        state: &mut PortfolioState,
        tx: &Transaction,
    ) -> Result<(), TransactionError> {
        match tx.kind {
            TransactionKind::Buy => self.handle_buy(tx, state),
            TransactionKind::Sell => self.handle_sell(tx, state),
            TransactionKind::Deposit => {
                add_cash(state, &tx.currency, tx.gross_amount() - tx.fee_amount());
                Ok(())
            }
            TransactionKind::Withdrawal | TransactionKind::Fee => {
                add_cash(state, &tx.currency, -(tx.gross_amount() + tx.fee_amount()));
                Ok(())
            }
            TransactionKind::Dividend => {
                // Paid-out dividends never reach the portfolio's cash.
                if self.dividends == DividendTreatment::Reinvest {
                    add_cash(state, &tx.currency, tx.gross_amount() - tx.fee_amount());
                }
                Ok(())
            }
        }
    }

    /// Handle BUY. Covers a short first; only the long part adds cost basis.
    fn handle_buy(
        &self,
        tx: &Transaction,
        state: &mut PortfolioState,
    ) -> Result<(), TransactionError> {
        let qty = tx.qty();
        let total_cost = tx.gross_amount() + tx.fee_amount();
        add_cash(state, &tx.currency, -total_cost);

        let symbol = tx.symbol_str();
        let position = state
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Holding::new(symbol, &tx.currency));

        let covered = if position.quantity < Decimal::ZERO {
            position.quantity.abs().min(qty)
        } else {
            Decimal::ZERO
        };
        let opened = qty - covered;
        if !opened.is_zero() {
            position.cost_basis += total_cost * opened / qty;
        }
        position.quantity += qty;

        if position.quantity.is_zero() {
            state.positions.remove(symbol);
        }
        Ok(())
    }

    /// Handle SELL. Cost basis leaves at average cost.
    fn handle_sell(
        &self,
        tx: &Transaction,
        state: &mut PortfolioState,
    ) -> Result<(), TransactionError> {
        let qty = tx.qty();
        let symbol = tx.symbol_str();
        let held = state.quantity_of(symbol);

        if self.shorts == ShortPositions::Reject && qty > held {
            return Err(TransactionError::InsufficientQuantity {
                id: tx.id.clone(),
                symbol: symbol.to_string(),
                held,
                requested: qty,
            });
        }

        add_cash(state, &tx.currency, tx.gross_amount() - tx.fee_amount());

        let position = state
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Holding::new(symbol, &tx.currency));

        match position.average_cost() {
            Some(avg) if qty < position.quantity => {
                position.cost_basis -= avg * qty;
            }
            _ => {
                position.cost_basis = Decimal::ZERO;
            }
        }
        position.quantity -= qty;

        if position.quantity.is_zero() {
            state.positions.remove(symbol);
        }
        Ok(())
    }

    /// Replays every transaction. Used to reject bad input up front.
    pub fn replay(&self, transactions: &[Transaction]) -> Result<PortfolioState, TransactionError> {
        let mut state = PortfolioState::default();
        for tx in transactions {
            self.apply(&mut state, tx)?;
        }
        Ok(state)
    }

    fn includes(&self, tx: &Transaction, point: &ValuationPoint) -> bool {
        if tx.occurred_at < point.date {
            return true;
        }
        if tx.occurred_at > point.date {
            return false;
        }
        match point.phase {
            SnapshotPhase::BeforeFlows => false,
            SnapshotPhase::AfterFlows => is_external_flow(tx, self.dividends),
            SnapshotPhase::EndOfDay => true,
        }
    }

    /// State at `point`, from transactions sorted by date.
    pub fn snapshot(
        &self,
        transactions: &[Transaction],
        point: ValuationPoint,
    ) -> Result<PortfolioState, TransactionError> {
        let mut state = PortfolioState::default();
        for tx in transactions
            .iter()
            .take_while(|tx| tx.occurred_at <= point.date)
            .filter(|tx| self.includes(tx, &point))
        {
            self.apply(&mut state, tx)?;
        }
        debug!(
            "Snapshot at {}: {} positions, {} cash balances",
            point,
            state.positions.len(),
            state.cash_balances.len()
        );
        Ok(state)
    }

    /// States at several points in a single pass.
    ///
    /// `points` must be sorted ascending. The running state holds every
    /// transaction dated before the current point's date; phases of that date
    /// are derived from a copy of it.
    pub fn snapshots(
        &self,
        transactions: &[Transaction],
        points: &[ValuationPoint],
    ) -> Result<Vec<(ValuationPoint, PortfolioState)>, TransactionError> {
        let mut result = Vec::with_capacity(points.len());
        let mut running = PortfolioState::default();
        let mut cursor = 0;

        for point in points {
            while cursor < transactions.len() && transactions[cursor].occurred_at < point.date {
                self.apply(&mut running, &transactions[cursor])?;
                cursor += 1;
            }

            let mut state = running.clone();
            if point.phase != SnapshotPhase::BeforeFlows {
                for tx in transactions[cursor..]
                    .iter()
                    .take_while(|tx| tx.occurred_at == point.date)
                    .filter(|tx| self.includes(tx, point))
                {
                    self.apply(&mut state, tx)?;
                }
            }
            result.push((*point, state));
        }
        Ok(result)
    }
}
