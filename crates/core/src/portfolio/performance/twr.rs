//! Time-weighted return.
//!
//! The period is cut into sub-periods at every external-flow date. The first
//! sub-period starts before the flows of the start date. A sub-period that
//! ends on a flow date ends right after that date's flows, and the flow is
//! attributed to it. The last sub-period ends at the close of the end date.
//! Extra boundaries without flows close at the end of their day.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::Result;
use crate::portfolio::holdings::{SnapshotPhase, ValuationPoint};
use crate::settings::UndefinedSubPeriods;

use super::{IssueScope, Period, PerformanceIssue, ReturnError, SubPeriodReturn};

/// `(EV - BV - CF) / BV`.
///
/// A sub-period starting from nothing is a pure funding step when the flow
/// explains the whole ending value, and has no defined return otherwise.
pub fn sub_period_return(
    start: NaiveDate,
    end: NaiveDate,
    beginning_value: Decimal,
    ending_value: Decimal,
    cash_flow: Decimal,
) -> std::result::Result<Decimal, ReturnError> {
    if beginning_value.is_zero() {
        if ending_value == cash_flow {
            return Ok(Decimal::ZERO);
        }
        return Err(ReturnError::Undefined {
            start,
            end,
            reason: format!(
                "beginning value is zero and the flow of {} does not explain the ending value of {}",
                cash_flow, ending_value
            ),
        });
    }
    if beginning_value < Decimal::ZERO {
        return Err(ReturnError::Undefined {
            start,
            end,
            reason: format!("beginning value {} is negative", beginning_value),
        });
    }
    (ending_value - beginning_value - cash_flow)
        .checked_div(beginning_value)
        .ok_or_else(|| ReturnError::Undefined {
            start,
            end,
            reason: format!(
                "return on a beginning value of {} overflows",
                beginning_value
            ),
        })
}

/// Geometric link: `prod(1 + r) - 1`. `None` when the product overflows.
pub fn link<I>(returns: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    returns
        .into_iter()
        .try_fold(Decimal::ONE, |acc, r| {
            Decimal::ONE.checked_add(r).and_then(|g| acc.checked_mul(g))
        })
        .and_then(|growth| growth.checked_sub(Decimal::ONE))
}

/// Boundary points of a period, in order.
///
/// `flow_dates` outside the period are ignored; `extra_dates` must lie in
/// `(start, end]`.
pub fn valuation_points(
    period: &Period,
    flow_dates: &[NaiveDate],
    extra_dates: &[NaiveDate],
) -> Vec<ValuationPoint> {
    let flows: BTreeSet<NaiveDate> = flow_dates
        .iter()
        .copied()
        .filter(|d| period.contains(*d))
        .collect();
    let mut closes: BTreeSet<NaiveDate> = extra_dates
        .iter()
        .copied()
        .filter(|d| *d > period.start && *d <= period.end)
        .collect();
    closes.insert(period.end);

    let mut points = BTreeSet::new();
    points.insert(ValuationPoint::before_flows(period.start));
    for date in &flows {
        points.insert(ValuationPoint::after_flows(*date));
    }
    for date in &closes {
        points.insert(ValuationPoint::end_of_day(*date));
    }
    points.into_iter().collect()
}

/// Sub-period returns of a period and the chain built from them.
#[derive(Debug, Clone)]
pub struct TwrOutcome {
    pub sub_periods: Vec<SubPeriodReturn>,
    pub issues: Vec<PerformanceIssue>,
    policy: UndefinedSubPeriods,
}

impl TwrOutcome {
    /// Linked return of the sub-periods ending on or before `date`.
    ///
    /// A sub-period missing either valuation always breaks the chain; only
    /// a valued sub-period with an undefined return may be excluded.
    pub fn cumulative_through(&self, date: NaiveDate) -> Option<Decimal> {
        let mut returns = Vec::new();
        for sub_period in self.sub_periods.iter().take_while(|sp| sp.end.date <= date) {
            if sub_period.beginning_value.is_none() || sub_period.ending_value.is_none() {
                return None;
            }
            match (sub_period.return_rate, self.policy) {
                (Some(r), _) => returns.push(r),
                (None, UndefinedSubPeriods::Exclude) => continue,
                (None, UndefinedSubPeriods::Propagate) => return None,
            }
        }
        link(returns)
    }

    /// Linked return of every sub-period.
    pub fn total(&self) -> Option<Decimal> {
        match self.sub_periods.last() {
            Some(last) => self.cumulative_through(last.end.date),
            None => Some(Decimal::ZERO),
        }
    }
}

pub struct TwrCalculator {
    policy: UndefinedSubPeriods,
}

impl TwrCalculator {
    pub fn new(policy: UndefinedSubPeriods) -> Self {
        Self { policy }
    }

    /// Computes every sub-period between consecutive `points`.
    ///
    /// `values` must hold an entry for each point; a failed valuation leaves
    /// the adjacent sub-periods without a return. `net_flows` holds the net
    /// external flow per date and is attributed to `AfterFlows` boundaries.
    pub fn calculate(
        &self,
        points: &[ValuationPoint],
        values: &BTreeMap<ValuationPoint, Result<Decimal>>,
        net_flows: &BTreeMap<NaiveDate, Decimal>,
    ) -> TwrOutcome {
        let value_of = |point: &ValuationPoint| -> Option<Decimal> {
            values.get(point).and_then(|v| v.as_ref().ok().copied())
        };

        let mut sub_periods = Vec::with_capacity(points.len().saturating_sub(1));
        let mut issues = Vec::new();

        for window in points.windows(2) {
            let (start, end) = (window[0], window[1]);
            let cash_flow = if end.phase == SnapshotPhase::AfterFlows {
                net_flows.get(&end.date).copied().unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };
            let beginning_value = value_of(&start);
            let ending_value = value_of(&end);

            let return_rate = match (beginning_value, ending_value) {
                (Some(bv), Some(ev)) => {
                    match sub_period_return(start.date, end.date, bv, ev, cash_flow) {
                        Ok(r) => Some(r),
                        Err(e) => {
                            warn!("{}", e);
                            issues.push(PerformanceIssue::new(
                                IssueScope::Twr,
                                start.date,
                                end.date,
                                e.to_string(),
                            ));
                            None
                        }
                    }
                }
                _ => None,
            };

            sub_periods.push(SubPeriodReturn {
                start,
                end,
                beginning_value,
                ending_value,
                cash_flow,
                return_rate,
            });
        }

        TwrOutcome {
            sub_periods,
            issues,
            policy: self.policy,
        }
    }
}
