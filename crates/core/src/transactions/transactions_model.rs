use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
    Dividend,
    Fee,
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Dividend => "dividend",
            TransactionKind::Fee => "fee",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }

    /// Order of kinds sharing a date: capital movements first, then trades,
    /// then fees, then dividends.
    pub fn sort_rank(&self) -> u8 {
        match self {
            TransactionKind::Deposit | TransactionKind::Withdrawal => 0,
            TransactionKind::Buy | TransactionKind::Sell => 1,
            TransactionKind::Fee => 2,
            TransactionKind::Dividend => 3,
        }
    }

    /// Kinds that refer to a security and therefore need a symbol.
    pub fn requires_symbol(&self) -> bool {
        matches!(
            self,
            TransactionKind::Buy | TransactionKind::Sell | TransactionKind::Dividend
        )
    }

    /// Kinds that change a position's quantity.
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded portfolio event.
///
/// Direction comes from `kind`; the sign of `quantity` is not interpreted.
/// For cash kinds the gross amount is still `|quantity| x price`, so a
/// deposit of 1000 may be recorded as quantity 1000 at price 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub kind: TransactionKind,
    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: String,
    pub occurred_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Decimal>,
}

impl Transaction {
    /// Absolute quantity
    pub fn qty(&self) -> Decimal {
        self.quantity.abs()
    }

    /// `|quantity| x price`, in the transaction currency
    pub fn gross_amount(&self) -> Decimal {
        self.qty() * self.price
    }

    /// Fee, defaulting to zero if not set
    pub fn fee_amount(&self) -> Decimal {
        self.fees.unwrap_or(Decimal::ZERO)
    }

    pub fn symbol_str(&self) -> &str {
        self.symbol.as_deref().unwrap_or("")
    }
}
