//! Entry points of the engine: portfolio structure and performance.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::fx::{is_known_currency, CurrencyConverter, FxRate};
use crate::portfolio::allocation::{AllocationCalculator, StructureResponse};
use crate::portfolio::holdings::{HoldingsCalculator, ValuationPoint};
use crate::portfolio::performance::{
    CashFlowExtractor, Granularity, IssueScope, PerformanceIssue, PerformanceResponse,
    PerformanceSeriesBuilder, Period,
};
use crate::portfolio::valuation::MarketValuer;
use crate::quotes::{PriceBar, PriceResolver};
use crate::settings::{DividendTreatment, EngineSettings};
use crate::transactions::{normalize, Transaction};

/// Reference data fetched by the caller before a computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(default)]
    pub price_bars: Vec<PriceBar>,
    #[serde(default)]
    pub fx_rates: Vec<FxRate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureRequest {
    pub base_currency: String,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRequest {
    pub base_currency: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub granularity: Option<Granularity>,
    /// Overrides the engine setting for this request.
    #[serde(default)]
    pub dividend_treatment: Option<DividendTreatment>,
}

fn check_base_currency(currency: &str) -> Result<()> {
    if !is_known_currency(currency) {
        return Err(ValidationError::UnsupportedCurrency(currency.to_string()).into());
    }
    Ok(())
}

/// Stateless engine. Every call builds its own converter and price resolver
/// and drops them with the response.
#[derive(Debug, Clone)]
pub struct PortfolioEngine {
    settings: EngineSettings,
}

impl PortfolioEngine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn converter(&self, market: &MarketData) -> CurrencyConverter {
        CurrencyConverter::new(&market.fx_rates, self.settings.fx_tolerance_days)
            .with_inverse_rates(self.settings.allow_inverse_rates)
    }

    /// Normalizes `transactions` and replays them once so that malformed
    /// input is rejected before anything is valued.
    fn prepare(
        &self,
        transactions: &[Transaction],
        prices: &PriceResolver,
        calculator: &HoldingsCalculator,
    ) -> Result<Vec<Transaction>> {
        let normalized = normalize(transactions, prices.splits(), prices.adjust_to())?;
        calculator.replay(&normalized)?;
        Ok(normalized)
    }

    /// Holdings as of `request.as_of`, valued and weighted in base currency.
    pub fn structure(
        &self,
        transactions: &[Transaction],
        market: &MarketData,
        request: &StructureRequest,
    ) -> Result<StructureResponse> {
        check_base_currency(&request.base_currency)?;
        info!(
            "Computing structure as of {} in {} ({} transactions)",
            request.as_of,
            request.base_currency,
            transactions.len()
        );

        let prices = PriceResolver::new(
            &market.price_bars,
            self.settings.price_staleness_days,
            request.as_of,
        );
        let fx = self.converter(market);
        let calculator =
            HoldingsCalculator::new(self.settings.dividend_treatment, self.settings.short_positions);
        let normalized = self.prepare(transactions, &prices, &calculator)?;

        let state = calculator.snapshot(&normalized, ValuationPoint::end_of_day(request.as_of))?;
        let response = AllocationCalculator::new(
            &prices,
            &fx,
            &request.base_currency,
            self.settings.include_cash_in_structure,
        )
        .compute(&state, request.as_of);

        if !response.unresolved.is_empty() {
            warn!(
                "{} holding(s) could not be valued as of {}",
                response.unresolved.len(),
                request.as_of
            );
        }
        Ok(response)
    }

    /// Time- and money-weighted returns over `[request.start, request.end]`.
    ///
    /// Only malformed requests or transactions fail the call. Missing market
    /// data leaves the affected figures empty and is listed in `issues`.
    pub fn performance(
        &self,
        transactions: &[Transaction],
        market: &MarketData,
        request: &PerformanceRequest,
    ) -> Result<PerformanceResponse> {
        check_base_currency(&request.base_currency)?;
        if request.start > request.end {
            return Err(ValidationError::InvalidInput(format!(
                "period start {} is after end {}",
                request.start, request.end
            ))
            .into());
        }
        let period = Period::new(request.start, request.end);
        let dividends = request
            .dividend_treatment
            .unwrap_or(self.settings.dividend_treatment);
        info!(
            "Computing performance {}..{} in {} (dividends: {:?})",
            period.start, period.end, request.base_currency, dividends
        );

        let prices = PriceResolver::new(
            &market.price_bars,
            self.settings.price_staleness_days,
            period.end,
        );
        let fx = self.converter(market);
        let calculator = HoldingsCalculator::new(dividends, self.settings.short_positions);
        let normalized = self.prepare(transactions, &prices, &calculator)?;

        let flows = match CashFlowExtractor::new(&fx, &request.base_currency, dividends)
            .extract(&normalized, &period)
        {
            Ok(flows) => flows,
            Err(e) => {
                warn!("Cash flows unavailable: {}", e);
                return Ok(PerformanceResponse::unavailable(
                    period,
                    &request.base_currency,
                    PerformanceIssue::new(IssueScope::CashFlows, period.start, period.end, e.to_string()),
                ));
            }
        };
        debug!("{} external cash flows in period", flows.len());

        let valuer = MarketValuer::new(
            &normalized,
            calculator,
            &prices,
            &fx,
            &request.base_currency,
        );
        Ok(PerformanceSeriesBuilder::new(self.settings.undefined_sub_periods).build(
            period,
            &request.base_currency,
            request.granularity,
            flows,
            &valuer,
        ))
    }
}
