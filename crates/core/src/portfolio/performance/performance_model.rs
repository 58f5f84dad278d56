use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::holdings::ValuationPoint;
use crate::transactions::{FlowType, TransactionKind};

/// Inclusive date range of a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Length in calendar days
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Spacing of the points of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// A cash flow in base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    /// Signed: positive into the portfolio
    pub amount: Decimal,
    pub kind: FlowType,
    /// Transaction kind that produced the flow
    pub source: TransactionKind,
    /// Currency of the originating transaction
    pub currency: String,
    pub transaction_id: String,
}

/// Return of one time-weighted sub-period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPeriodReturn {
    pub start: ValuationPoint,
    pub end: ValuationPoint,
    pub beginning_value: Option<Decimal>,
    pub ending_value: Option<Decimal>,
    /// Net external flow at the end boundary
    pub cash_flow: Decimal,
    #[serde(rename = "return")]
    pub return_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<Decimal>,
    pub cumulative_twr: Option<Decimal>,
    pub cumulative_mwr: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueScope {
    CashFlows,
    Valuation,
    Twr,
    Mwr,
}

/// Explains why a value in the response is missing or was left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceIssue {
    pub scope: IssueScope,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub message: String,
}

impl PerformanceIssue {
    pub fn new(scope: IssueScope, start: NaiveDate, end: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            scope,
            start,
            end,
            message: message.into(),
        }
    }
}

/// Performance over a period. `None` fields could not be computed; the
/// reason is listed in `issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub period: Period,
    /// Base currency
    pub currency: String,
    pub beginning_value: Option<Decimal>,
    pub ending_value: Option<Decimal>,
    pub net_cash_flow: Option<Decimal>,
    pub gain_loss: Option<Decimal>,
    pub external_cash_flows: Vec<CashFlow>,
    pub twr: Option<Decimal>,
    pub mwr: Option<Decimal>,
    pub annualized_twr: Option<Decimal>,
    pub annualized_mwr: Option<Decimal>,
    pub sub_periods: Vec<SubPeriodReturn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<SeriesPoint>>,
    pub issues: Vec<PerformanceIssue>,
}

impl PerformanceResponse {
    /// A response with nothing computed.
    pub fn unavailable(period: Period, currency: &str, issue: PerformanceIssue) -> Self {
        Self {
            period,
            currency: currency.to_string(),
            beginning_value: None,
            ending_value: None,
            net_cash_flow: None,
            gain_loss: None,
            external_cash_flows: Vec::new(),
            twr: None,
            mwr: None,
            annualized_twr: None,
            annualized_mwr: None,
            sub_periods: Vec::new(),
            series: None,
            issues: vec![issue],
        }
    }
}
