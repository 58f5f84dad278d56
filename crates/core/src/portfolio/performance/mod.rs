//! Performance module - external cash flows, TWR, MWR and return series.

mod cash_flows;
mod mwr;
mod performance_errors;
mod performance_model;
mod performance_service;
mod twr;

pub use cash_flows::{external_flow_amount, net_flow_on, net_flows_by_date, CashFlowExtractor};
pub use mwr::{flow_weight, modified_dietz};
pub use performance_errors::ReturnError;
pub use performance_model::*;
pub use performance_service::{annualize, PerformanceSeriesBuilder};
pub use twr::{link, sub_period_return, valuation_points, TwrCalculator, TwrOutcome};
