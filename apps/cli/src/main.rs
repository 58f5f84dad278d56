mod config;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use perfolio_core::settings::EngineSettings;
use perfolio_core::transactions::Transaction;
use perfolio_core::{MarketData, PerformanceRequest, PortfolioEngine, StructureRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;

/// Portfolio structure and performance from a JSON request document.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Holdings, values and weights as of a date.
    Structure {
        /// Request document, or `-` for stdin
        file: PathBuf,
    },
    /// Time- and money-weighted returns over a period.
    Performance {
        /// Request document, or `-` for stdin
        file: PathBuf,
    },
}

/// Everything one computation needs. `settings` replaces the environment
/// configuration when present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestDocument<R> {
    #[serde(default)]
    settings: Option<EngineSettings>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    market_data: MarketData,
    request: R,
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn read_document<R: DeserializeOwned>(path: &Path) -> Result<RequestDocument<R>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Invalid request document {}", path.display()))
}

fn build_engine(config: &Config, overrides: Option<EngineSettings>) -> Result<PortfolioEngine> {
    let settings = overrides.unwrap_or_else(|| config.settings.clone());
    PortfolioEngine::new(settings).context("Invalid engine settings")
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    match cli.command {
        Commands::Structure { file } => {
            let doc: RequestDocument<StructureRequest> = read_document(&file)?;
            let engine = build_engine(&config, doc.settings)?;
            let response = engine
                .structure(&doc.transactions, &doc.market_data, &doc.request)
                .context("Structure computation failed")?;
            tracing::info!(
                "Structure: {} items, {} unresolved",
                response.items.len(),
                response.unresolved.len()
            );
            print_json(&response, cli.compact)
        }
        Commands::Performance { file } => {
            let doc: RequestDocument<PerformanceRequest> = read_document(&file)?;
            let engine = build_engine(&config, doc.settings)?;
            let response = engine
                .performance(&doc.transactions, &doc.market_data, &doc.request)
                .context("Performance computation failed")?;
            if !response.issues.is_empty() {
                tracing::warn!("{} performance issue(s) reported", response.issues.len());
            }
            print_json(&response, cli.compact)
        }
    }
}
