//! Builds the performance response for a period.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::{Decimal, MathematicalOps};
use std::collections::BTreeMap;

use crate::constants::{DAYS_PER_YEAR, DECIMAL_PRECISION};
use crate::errors::Result;
use crate::portfolio::holdings::ValuationPoint;
use crate::portfolio::valuation::PortfolioValuer;
use crate::settings::UndefinedSubPeriods;
use crate::utils::time_utils::period_end_dates;

use super::cash_flows::net_flows_by_date;
use super::mwr::modified_dietz;
use super::twr::{valuation_points, TwrCalculator};
use super::{
    CashFlow, Granularity, IssueScope, PerformanceIssue, PerformanceResponse, Period,
    SeriesPoint, SubPeriodReturn,
};

fn round(value: Decimal) -> Decimal {
    value.round_dp(DECIMAL_PRECISION)
}

/// Annualizes a cumulative return over `period`.
///
/// Periods shorter than a year are returned as they are. A loss of 100% or
/// more stays at -1.
pub fn annualize(cumulative: Decimal, period: &Period) -> Option<Decimal> {
    let days = period.days();
    if days < 365 {
        return Some(cumulative);
    }
    let growth = Decimal::ONE + cumulative;
    if growth <= Decimal::ZERO {
        return Some(-Decimal::ONE);
    }
    let years = Decimal::from(days) / DAYS_PER_YEAR;
    growth
        .checked_powd(Decimal::ONE / years)
        .map(|annual| annual - Decimal::ONE)
}

/// Orchestrates valuation, TWR and MWR over a period and an optional series.
pub struct PerformanceSeriesBuilder {
    policy: UndefinedSubPeriods,
}

impl PerformanceSeriesBuilder {
    pub fn new(policy: UndefinedSubPeriods) -> Self {
        Self { policy }
    }

    fn mwr_or_issue(
        window: &Period,
        beginning_value: Option<Decimal>,
        ending_value: Option<Decimal>,
        flows: &[CashFlow],
        issues: &mut Vec<PerformanceIssue>,
    ) -> Option<Decimal> {
        let (bv, ev) = (beginning_value?, ending_value?);
        match modified_dietz(window, bv, ev, flows) {
            Ok(mwr) => Some(mwr),
            Err(e) => {
                warn!("{}", e);
                issues.push(PerformanceIssue::new(
                    IssueScope::Mwr,
                    window.start,
                    window.end,
                    e.to_string(),
                ));
                None
            }
        }
    }

    pub fn build(
        &self,
        period: Period,
        currency: &str,
        granularity: Option<Granularity>,
        flows: Vec<CashFlow>,
        valuer: &dyn PortfolioValuer,
    ) -> PerformanceResponse {
        let series_dates: Vec<NaiveDate> = granularity
            .map(|g| period_end_dates(period.start, period.end, g))
            .unwrap_or_default();
        let net_flows = net_flows_by_date(&flows);
        let flow_dates: Vec<NaiveDate> = net_flows.keys().copied().collect();

        let points = valuation_points(&period, &flow_dates, &series_dates);
        debug!(
            "Valuing {} points for {}..{} ({} flow dates)",
            points.len(),
            period.start,
            period.end,
            flow_dates.len()
        );
        let values: BTreeMap<ValuationPoint, Result<Decimal>> =
            valuer.value_points(&points).into_iter().collect();

        let mut issues: Vec<PerformanceIssue> = values
            .iter()
            .filter_map(|(point, value)| {
                value.as_ref().err().map(|e| {
                    PerformanceIssue::new(IssueScope::Valuation, point.date, point.date, e.to_string())
                })
            })
            .collect();

        let value_of = |point: ValuationPoint| -> Option<Decimal> {
            values.get(&point).and_then(|v| v.as_ref().ok().copied())
        };

        let twr = TwrCalculator::new(self.policy).calculate(&points, &values, &net_flows);
        issues.extend(twr.issues.iter().cloned());

        let beginning_value = value_of(ValuationPoint::before_flows(period.start));
        let ending_value = value_of(ValuationPoint::end_of_day(period.end));
        let net_cash_flow: Decimal = flows.iter().map(|f| f.amount).sum();
        let gain_loss = match (beginning_value, ending_value) {
            (Some(bv), Some(ev)) => Some(ev - bv - net_cash_flow),
            _ => None,
        };

        let twr_total = twr.total();
        let mwr_total =
            Self::mwr_or_issue(&period, beginning_value, ending_value, &flows, &mut issues);

        let series = granularity.map(|_| {
            series_dates
                .iter()
                .map(|date| {
                    let window = Period::new(period.start, *date);
                    let value = value_of(ValuationPoint::end_of_day(*date));
                    let cumulative_mwr = if *date == period.end {
                        mwr_total
                    } else {
                        Self::mwr_or_issue(&window, beginning_value, value, &flows, &mut issues)
                    };
                    SeriesPoint {
                        date: *date,
                        value: value.map(round),
                        cumulative_twr: twr.cumulative_through(*date).map(round),
                        cumulative_mwr: cumulative_mwr.map(round),
                    }
                })
                .collect::<Vec<_>>()
        });

        let sub_periods = twr
            .sub_periods
            .iter()
            .map(|sp| SubPeriodReturn {
                beginning_value: sp.beginning_value.map(round),
                ending_value: sp.ending_value.map(round),
                cash_flow: round(sp.cash_flow),
                return_rate: sp.return_rate.map(round),
                ..sp.clone()
            })
            .collect();

        PerformanceResponse {
            period,
            currency: currency.to_string(),
            beginning_value: beginning_value.map(round),
            ending_value: ending_value.map(round),
            net_cash_flow: Some(round(net_cash_flow)),
            gain_loss: gain_loss.map(round),
            twr: twr_total.map(round),
            mwr: mwr_total.map(round),
            annualized_twr: twr_total.and_then(|r| annualize(r, &period)).map(round),
            annualized_mwr: mwr_total.and_then(|r| annualize(r, &period)).map(round),
            external_cash_flows: flows,
            sub_periods,
            series,
            issues,
        }
    }
}
