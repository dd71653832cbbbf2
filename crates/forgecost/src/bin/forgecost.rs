//! Forgecost command line.
//!
//! Usage:
//!   forgecost --catalog data/catalog.toml evaluate --ticker PE --exchange AI1
//!   forgecost --catalog data/catalog.toml evaluate --ticker H --exchange AI1 --location Montem --experts 2
//!   forgecost --catalog data/catalog.toml arbitrage --ticker RAT
//!   forgecost --config forgecost.toml check

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use forgecost::report::{render_arbitrage, render_evaluation, render_summary};
use forgecost::{load_catalog, CatalogSummary, ForgecostConfig};
use forgecost_economy::{EfficiencyInputs, EvaluationRequest};
use tracing_subscriber::EnvFilter;

/// Production cost, profitability and arbitrage tracker
#[derive(Parser, Debug)]
#[command(name = "forgecost", version)]
#[command(about = "Production cost, profitability and arbitrage for crafting economies")]
struct Cli {
    /// Configuration file (defaults to ./forgecost.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file (overrides the configured path)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cost breakdown and profit scenarios for producing one material
    Evaluate {
        /// Target material
        #[arg(short, long)]
        ticker: String,

        /// Exchange to price on
        #[arg(short, long)]
        exchange: String,

        /// Recipe id (cheapest is picked when omitted)
        #[arg(short, long)]
        recipe: Option<String>,

        /// Production location
        #[arg(short, long)]
        location: Option<String>,

        /// Workers get essential consumables only
        #[arg(long)]
        essential_only: bool,

        /// Custom base efficiency in percent (1-100)
        #[arg(long)]
        efficiency_pct: Option<f64>,

        /// Planetary program active
        #[arg(long)]
        cogc: bool,

        /// Number of experts (0-5)
        #[arg(long, default_value_t = 0)]
        experts: u8,
    },

    /// Ranked cross-exchange buy/sell opportunities
    Arbitrage {
        /// Material
        #[arg(short, long)]
        ticker: String,

        /// Minimum margin in percent (overrides the config file)
        #[arg(long)]
        min_profit_pct: Option<f64>,
    },

    /// Catalog statistics and recipe cycle check
    Check,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Priority: CLI args > config file > defaults
    let mut config = ForgecostConfig::discover(cli.config.as_deref()).context("loading configuration")?;
    let Some(catalog_path) = cli.catalog.or_else(|| config.catalog_path(cli.config.as_deref())) else {
        bail!("no catalog given: pass --catalog or set [catalog] path in the configuration");
    };
    let snapshot =
        load_catalog(&catalog_path).with_context(|| format!("loading catalog {}", catalog_path.display()))?;

    let output = match cli.command {
        Commands::Evaluate {
            ticker,
            exchange,
            recipe,
            location,
            essential_only,
            efficiency_pct,
            cogc,
            experts,
        } => {
            let request = EvaluationRequest {
                ticker,
                exchange,
                recipe,
                location,
                efficiency: EfficiencyInputs {
                    luxury_provided: !essential_only,
                    custom_efficiency_pct: efficiency_pct,
                    cogc_active: cogc,
                    expert_count: experts,
                    ..EfficiencyInputs::default()
                },
            };
            let evaluation = config.engine(&snapshot).evaluate(&request)?;
            if !evaluation.diagnostics.is_complete() {
                tracing::warn!(
                    missing = ?evaluation.diagnostics.missing_prices,
                    "some prices were missing and counted as zero"
                );
            }
            render_evaluation(&evaluation)?
        }
        Commands::Arbitrage {
            ticker,
            min_profit_pct,
        } => {
            if let Some(min_profit_pct) = min_profit_pct {
                config.arbitrage.min_profit_pct = min_profit_pct;
            }
            let opportunities = config.engine(&snapshot).arbitrage(&ticker)?;
            tracing::info!(ticker = %ticker, found = opportunities.len(), "arbitrage scan complete");
            render_arbitrage(&ticker, &opportunities)?
        }
        Commands::Check => {
            let summary = CatalogSummary::of(&snapshot);
            if let Some(cycle) = &summary.cycle {
                tracing::info!(cycle = %cycle.join(" -> "), "recipe graph contains a cycle");
            }
            render_summary(&summary)?
        }
    };

    print!("{output}");
    Ok(())
}
