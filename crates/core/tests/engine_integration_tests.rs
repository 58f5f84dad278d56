//! End-to-end tests of the public engine API with JSON fixtures.

use perfolio_core::errors::Error;
use perfolio_core::portfolio::performance::{IssueScope, PerformanceResponse};
use perfolio_core::settings::EngineSettings;
use perfolio_core::transactions::{Transaction, TransactionError};
use perfolio_core::{MarketData, PerformanceRequest, PortfolioEngine, StructureRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn transactions(value: Value) -> Vec<Transaction> {
    serde_json::from_value(value).unwrap()
}

fn market(value: Value) -> MarketData {
    serde_json::from_value(value).unwrap()
}

fn engine(settings: Value) -> PortfolioEngine {
    let settings: EngineSettings = serde_json::from_value(settings).unwrap();
    PortfolioEngine::new(settings).unwrap()
}

fn performance(
    engine: &PortfolioEngine,
    txs: &[Transaction],
    market: &MarketData,
    request: Value,
) -> PerformanceResponse {
    let request: PerformanceRequest = serde_json::from_value(request).unwrap();
    engine.performance(txs, market, &request).unwrap()
}

/// Ten AAPL bought at 100 before the period; 200 deposited on the 50th day
/// of a 100-day period, when the position is worth 1100.
fn mid_period_deposit_fixture() -> (Vec<Transaction>, MarketData) {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "USD", "occurredAt": "2023-12-29"},
        {"id": "b1", "kind": "buy", "symbol": "AAPL", "quantity": 10, "price": 100, "currency": "USD", "occurredAt": "2023-12-29"},
        {"id": "d2", "kind": "deposit", "quantity": 200, "price": 1, "currency": "USD", "occurredAt": "2024-02-20"}
    ]));
    let market = market(json!({
        "priceBars": [
            {"symbol": "AAPL", "date": "2023-12-29", "close": 100},
            {"symbol": "AAPL", "date": "2024-01-31", "close": 100},
            {"symbol": "AAPL", "date": "2024-02-20", "close": 110},
            {"symbol": "AAPL", "date": "2024-03-31", "close": 110},
            {"symbol": "AAPL", "date": "2024-04-10", "close": 110}
        ]
    }));
    (txs, market)
}

#[test]
fn test_mid_period_deposit_twr_and_mwr() {
    let (txs, market) = mid_period_deposit_fixture();
    let response = performance(
        &engine(json!({})),
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-04-10"}),
    );

    assert_eq!(response.beginning_value, Some(dec!(1000)));
    assert_eq!(response.ending_value, Some(dec!(1300)));
    assert_eq!(response.net_cash_flow, Some(dec!(200)));
    assert_eq!(response.gain_loss, Some(dec!(100)));
    assert_eq!(response.twr, Some(dec!(0.1)));
    assert_eq!(response.mwr, Some(dec!(0.090909)));
    assert_eq!(response.annualized_twr, response.twr);
    assert_eq!(response.external_cash_flows.len(), 1);
    assert_eq!(response.external_cash_flows[0].amount, dec!(200));
    assert_eq!(response.external_cash_flows[0].transaction_id, "d2");
    assert!(response.issues.is_empty());
}

#[test]
fn test_response_json_shape() {
    let (txs, market) = mid_period_deposit_fixture();
    let response = performance(
        &engine(json!({})),
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-04-10", "granularity": "monthly"}),
    );
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["period"], json!({"start": "2024-01-01", "end": "2024-04-10"}));
    assert_eq!(json["twr"], json!(0.1));
    assert_eq!(json["subPeriods"][0]["end"]["phase"], json!("endOfDay"));
    assert_eq!(json["subPeriods"][1]["end"]["phase"], json!("afterFlows"));
    assert_eq!(json["subPeriods"][1]["cashFlow"], json!(200.0));
    let series = json["series"].as_array().unwrap();
    let dates: Vec<&str> = series.iter().map(|p| p["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2024-01-31", "2024-02-29", "2024-03-31", "2024-04-10"]);
    assert!(series.iter().all(|p| p.get("cumulativeTwr").is_some()));
    assert_eq!(series[3]["cumulativeTwr"], json!(0.1));
}

#[test]
fn test_funding_on_start_date_is_a_zero_return_step() {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "USD", "occurredAt": "2024-01-02"},
        {"id": "b1", "kind": "buy", "symbol": "MSFT", "quantity": 2, "price": 500, "currency": "USD", "occurredAt": "2024-01-02"}
    ]));
    let market = market(json!({
        "priceBars": [
            {"symbol": "MSFT", "date": "2024-01-02", "close": 500},
            {"symbol": "MSFT", "date": "2024-01-31", "close": 600}
        ]
    }));

    let response = performance(
        &engine(json!({})),
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-02", "end": "2024-01-31"}),
    );

    assert_eq!(response.beginning_value, Some(Decimal::ZERO));
    assert_eq!(response.sub_periods[0].return_rate, Some(Decimal::ZERO));
    assert_eq!(response.twr, Some(dec!(0.2)));
    assert_eq!(response.mwr, Some(dec!(0.2)));
    assert!(response.issues.is_empty());
}

fn dividend_fixture() -> (Vec<Transaction>, MarketData) {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "USD", "occurredAt": "2023-12-29"},
        {"id": "b1", "kind": "buy", "symbol": "KO", "quantity": 10, "price": 100, "currency": "USD", "occurredAt": "2023-12-29"},
        {"id": "v1", "kind": "dividend", "symbol": "KO", "quantity": 10, "price": 5, "currency": "USD", "occurredAt": "2024-01-15"}
    ]));
    let market = market(json!({
        "priceBars": [
            {"symbol": "KO", "date": "2023-12-29", "close": 100},
            {"symbol": "KO", "date": "2024-01-10", "close": 100},
            {"symbol": "KO", "date": "2024-01-31", "close": 100}
        ]
    }));
    (txs, market)
}

#[test]
fn test_dividend_treatment_per_request() {
    let (txs, market) = dividend_fixture();
    let engine = engine(json!({}));

    let reinvested = performance(
        &engine,
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-01-31"}),
    );
    assert!(reinvested.external_cash_flows.is_empty());
    assert_eq!(reinvested.ending_value, Some(dec!(1050)));
    assert_eq!(reinvested.twr, Some(dec!(0.05)));
    assert_eq!(reinvested.mwr, Some(dec!(0.05)));

    let paid_out = performance(
        &engine,
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-01-31", "dividendTreatment": "external"}),
    );
    assert_eq!(paid_out.external_cash_flows.len(), 1);
    assert_eq!(paid_out.external_cash_flows[0].amount, dec!(-50));
    assert_eq!(paid_out.ending_value, Some(dec!(1000)));
    assert_eq!(paid_out.gain_loss, Some(dec!(50)));
    assert_eq!(paid_out.twr, Some(dec!(0.05)));
    // 50 / (1000 - 50 * 16 / 30)
    assert_eq!(paid_out.mwr, Some(dec!(0.051370)));
}

#[test]
fn test_split_keeps_returns_continuous() {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 2000, "price": 1, "currency": "USD", "occurredAt": "2023-12-29"},
        {"id": "b1", "kind": "buy", "symbol": "NVDA", "quantity": 10, "price": 200, "currency": "USD", "occurredAt": "2023-12-29"}
    ]));
    let market = market(json!({
        "priceBars": [
            {"symbol": "NVDA", "date": "2023-12-29", "close": 200},
            {"symbol": "NVDA", "date": "2024-01-08", "close": 200},
            {"symbol": "NVDA", "date": "2024-01-15", "close": 105, "splitRatio": 2},
            {"symbol": "NVDA", "date": "2024-01-22", "close": 108},
            {"symbol": "NVDA", "date": "2024-01-31", "close": 110}
        ]
    }));
    let engine = engine(json!({}));

    let response = performance(
        &engine,
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-01-31", "granularity": "weekly"}),
    );
    assert_eq!(response.beginning_value, Some(dec!(2000)));
    assert_eq!(response.ending_value, Some(dec!(2200)));
    assert_eq!(response.twr, Some(dec!(0.1)));
    assert!(response.issues.is_empty());

    let request: StructureRequest =
        serde_json::from_value(json!({"baseCurrency": "USD", "asOf": "2024-01-31"})).unwrap();
    let structure = engine.structure(&txs, &market, &request).unwrap();
    assert_eq!(structure.items[0].quantity, dec!(20));
    assert_eq!(structure.items[0].price, dec!(110));
}

#[test]
fn test_multi_currency_structure_with_cash() {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "EUR", "occurredAt": "2024-03-01"},
        {"id": "b1", "kind": "buy", "symbol": "SAP", "quantity": 4, "price": 150, "currency": "EUR", "occurredAt": "2024-03-01", "fees": 5},
        {"id": "d2", "kind": "deposit", "quantity": 500, "price": 1, "currency": "USD", "occurredAt": "2024-03-04"},
        {"id": "b2", "kind": "buy", "symbol": "AAPL", "quantity": 2, "price": 170, "currency": "USD", "occurredAt": "2024-03-04"}
    ]));
    let market = market(json!({
        "priceBars": [
            {"symbol": "SAP", "date": "2024-03-28", "close": 175},
            {"symbol": "AAPL", "date": "2024-03-28", "close": 172}
        ],
        "fxRates": [
            {"baseCurrency": "EUR", "quoteCurrency": "USD", "date": "2024-03-27", "rate": 1.08}
        ]
    }));
    let engine = engine(json!({"includeCashInStructure": true}));
    let request: StructureRequest =
        serde_json::from_value(json!({"baseCurrency": "USD", "asOf": "2024-03-28"})).unwrap();

    let structure = engine.structure(&txs, &market, &request).unwrap();

    let symbols: Vec<&str> = structure.items.iter().map(|i| i.symbol.as_str()).collect();
    // SAP 756, CASH:EUR 395 x 1.08 = 426.6, AAPL 344, CASH:USD 160
    assert_eq!(symbols, vec!["SAP", "CASH:EUR", "AAPL", "CASH:USD"]);
    assert_eq!(structure.total_value, dec!(1686.6));
    assert_eq!(structure.items[0].price, dec!(189));
    let weights: Decimal = structure.items.iter().map(|i| i.weight).sum();
    assert!((weights - Decimal::ONE).abs() < dec!(0.000000001));
    assert!(structure.unresolved.is_empty());
}

#[test]
fn test_unpriced_holding_is_reported_not_fatal() {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "USD", "occurredAt": "2024-01-02"},
        {"id": "b1", "kind": "buy", "symbol": "AAPL", "quantity": 2, "price": 100, "currency": "USD", "occurredAt": "2024-01-02"},
        {"id": "b2", "kind": "buy", "symbol": "DELISTED", "quantity": 5, "price": 20, "currency": "USD", "occurredAt": "2024-01-02"}
    ]));
    let market = market(json!({
        "priceBars": [
            {"symbol": "AAPL", "date": "2024-03-01", "close": 150},
            {"symbol": "DELISTED", "date": "2024-01-02", "close": 20}
        ]
    }));
    let engine = engine(json!({}));

    let request: StructureRequest =
        serde_json::from_value(json!({"baseCurrency": "USD", "asOf": "2024-03-01"})).unwrap();
    let structure = engine.structure(&txs, &market, &request).unwrap();
    assert_eq!(structure.items.len(), 1);
    assert_eq!(structure.items[0].weight, Decimal::ONE);
    assert_eq!(structure.unresolved.len(), 1);
    assert_eq!(structure.unresolved[0].symbol, "DELISTED");

    let response = performance(
        &engine,
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-02-01", "end": "2024-03-01"}),
    );
    assert_eq!(response.twr, None);
    assert_eq!(response.mwr, None);
    assert!(response
        .issues
        .iter()
        .any(|issue| issue.scope == IssueScope::Valuation));
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["twr"].is_null());
}

#[test]
fn test_invalid_transaction_fails_the_request() {
    let txs = transactions(json!([
        {"id": "bad", "kind": "buy", "symbol": "AAPL", "quantity": 1, "price": -5, "currency": "USD", "occurredAt": "2024-01-02"}
    ]));
    let request: StructureRequest =
        serde_json::from_value(json!({"baseCurrency": "USD", "asOf": "2024-01-31"})).unwrap();

    let result = engine(json!({})).structure(&txs, &MarketData::default(), &request);
    assert!(matches!(
        result,
        Err(Error::InvalidTransaction(TransactionError::NegativePrice { .. }))
    ));
}

#[test]
fn test_excluding_undefined_sub_periods_still_needs_an_ending_value() {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "USD", "occurredAt": "2023-12-29"},
        {"id": "b1", "kind": "buy", "symbol": "AAPL", "quantity": 10, "price": 100, "currency": "USD", "occurredAt": "2023-12-29"}
    ]));
    // No close within reach of 2024-03-31.
    let market = market(json!({
        "priceBars": [
            {"symbol": "AAPL", "date": "2023-12-29", "close": 100},
            {"symbol": "AAPL", "date": "2024-01-31", "close": 100},
            {"symbol": "AAPL", "date": "2024-02-29", "close": 75}
        ]
    }));

    let response = performance(
        &engine(json!({"undefinedSubPeriods": "exclude"})),
        &txs,
        &market,
        json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-03-31", "granularity": "monthly"}),
    );

    assert_eq!(response.beginning_value, Some(dec!(1000)));
    assert_eq!(response.ending_value, None);
    assert_eq!(response.twr, None);
    assert_eq!(response.annualized_twr, None);
    assert_eq!(response.mwr, None);
    assert!(response
        .issues
        .iter()
        .any(|issue| issue.scope == IssueScope::Valuation));

    let series = response.series.unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[1].cumulative_twr, Some(dec!(-0.25)));
    assert_eq!(series[2].cumulative_twr, None);
}

#[test]
fn test_inverse_rates_through_the_engine() {
    let txs = transactions(json!([
        {"id": "d1", "kind": "deposit", "quantity": 800, "price": 1, "currency": "EUR", "occurredAt": "2024-01-02"}
    ]));
    // Only USD -> EUR is quoted.
    let market = market(json!({
        "fxRates": [
            {"baseCurrency": "USD", "quoteCurrency": "EUR", "date": "2024-01-02", "rate": 0.8},
            {"baseCurrency": "USD", "quoteCurrency": "EUR", "date": "2024-01-31", "rate": 0.8}
        ]
    }));
    let request = json!({"baseCurrency": "USD", "start": "2024-01-01", "end": "2024-01-31"});

    let direct_only = performance(&engine(json!({})), &txs, &market, request.clone());
    assert_eq!(direct_only.twr, None);
    assert_eq!(direct_only.issues.len(), 1);
    assert_eq!(direct_only.issues[0].scope, IssueScope::CashFlows);

    let inverted = performance(
        &engine(json!({"allowInverseRates": true})),
        &txs,
        &market,
        request,
    );
    assert_eq!(inverted.external_cash_flows.len(), 1);
    assert_eq!(inverted.external_cash_flows[0].amount, dec!(1000));
    assert_eq!(inverted.ending_value, Some(dec!(1000)));
    assert_eq!(inverted.twr, Some(Decimal::ZERO));
    assert!(inverted.issues.is_empty());
}
