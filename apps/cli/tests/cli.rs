use assert_cmd::{cargo, Command};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_request(dir: &TempDir, name: &str, document: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(document).unwrap()).expect("failed to write request");
    path
}

fn perfolio(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("perfolio"));
    // Keep a developer's .env out of the run.
    cmd.current_dir(dir.path());
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn portfolio_document(request: Value) -> Value {
    json!({
        "transactions": [
            {"id": "d1", "kind": "deposit", "quantity": 1000, "price": 1, "currency": "USD", "occurredAt": "2024-01-02"},
            {"id": "b1", "kind": "buy", "symbol": "AAPL", "quantity": 5, "price": 100, "currency": "USD", "occurredAt": "2024-01-02"}
        ],
        "marketData": {
            "priceBars": [
                {"symbol": "AAPL", "date": "2024-01-02", "close": 100},
                {"symbol": "AAPL", "date": "2024-01-31", "close": 120}
            ]
        },
        "request": request
    })
}

#[test]
fn structure_prints_weights() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write_request(
        &dir,
        "structure.json",
        &portfolio_document(json!({"baseCurrency": "USD", "asOf": "2024-01-31"})),
    );

    let output = perfolio(&dir)
        .arg("structure")
        .arg(&path)
        .arg("--compact")
        .output()
        .unwrap();
    assert!(output.status.success());

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["totalValue"], json!(600.0));
    assert_eq!(response["items"][0]["symbol"], json!("AAPL"));
    assert_eq!(response["items"][0]["weight"], json!(1.0));
}

#[test]
fn include_cash_from_environment_and_document_override() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let request = json!({"baseCurrency": "USD", "asOf": "2024-01-31"});
    let path = write_request(&dir, "structure.json", &portfolio_document(request.clone()));

    perfolio(&dir)
        .env("PERFOLIO_INCLUDE_CASH", "true")
        .arg("structure")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("CASH:USD"));

    let mut document = portfolio_document(request);
    document["settings"] = json!({"includeCashInStructure": false});
    let path = write_request(&dir, "override.json", &document);
    perfolio(&dir)
        .env("PERFOLIO_INCLUDE_CASH", "true")
        .arg("structure")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("CASH:USD").not());
}

#[test]
fn performance_reads_stdin() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let document = portfolio_document(json!({
        "baseCurrency": "USD",
        "start": "2024-01-02",
        "end": "2024-01-31",
        "granularity": "monthly"
    }));

    perfolio(&dir)
        .arg("performance")
        .arg("-")
        .write_stdin(serde_json::to_string(&document).unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"twr\": 0.1"))
        .stdout(predicate::str::contains("\"series\""));
}

#[test]
fn invalid_transaction_exits_with_error() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let document = json!({
        "transactions": [
            {"id": "bad", "kind": "buy", "symbol": "AAPL", "quantity": 0, "price": 10, "currency": "USD", "occurredAt": "2024-01-02"}
        ],
        "request": {"baseCurrency": "USD", "asOf": "2024-01-31"}
    });
    let path = write_request(&dir, "bad.json", &document);

    perfolio(&dir)
        .arg("structure")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Structure computation failed"));
}

#[test]
fn invalid_environment_setting_is_reported() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write_request(
        &dir,
        "structure.json",
        &portfolio_document(json!({"baseCurrency": "USD", "asOf": "2024-01-31"})),
    );

    perfolio(&dir)
        .env("PERFOLIO_DIVIDEND_TREATMENT", "sometimes")
        .arg("structure")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PERFOLIO_DIVIDEND_TREATMENT"));
}
