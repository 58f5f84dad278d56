//! Money-weighted return by the Modified Dietz method.

use rust_decimal::Decimal;

use super::{CashFlow, Period, ReturnError};

/// Share of the period a flow on `offset_days` stays invested.
///
/// A zero-length period gives every flow full weight.
pub fn flow_weight(period_days: i64, offset_days: i64) -> Decimal {
    if period_days <= 0 {
        return Decimal::ONE;
    }
    Decimal::from(period_days - offset_days) / Decimal::from(period_days)
}

/// `(EV - BV - sum(CF)) / (BV + sum(CF x W))` with `W = (T - t) / T`.
///
/// Flows dated outside `period` are ignored. A denominator at or below zero
/// has no meaningful return and is reported as undefined.
pub fn modified_dietz(
    period: &Period,
    beginning_value: Decimal,
    ending_value: Decimal,
    flows: &[CashFlow],
) -> Result<Decimal, ReturnError> {
    let total_days = period.days();

    let mut net_flow = Decimal::ZERO;
    let mut weighted_flow = Decimal::ZERO;
    for flow in flows.iter().filter(|f| period.contains(f.date)) {
        let offset = (flow.date - period.start).num_days();
        net_flow += flow.amount;
        weighted_flow += flow.amount * flow_weight(total_days, offset);
    }

    let denominator = beginning_value + weighted_flow;
    if denominator <= Decimal::ZERO {
        return Err(ReturnError::Undefined {
            start: period.start,
            end: period.end,
            reason: format!("invested capital {} is not positive", denominator),
        });
    }

    Ok((ending_value - beginning_value - net_flow) / denominator)
}
