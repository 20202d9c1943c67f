//! quantii - store diagnostics and maintenance for the till.
//!
//! - `check`: write/read/delete probe against the configured store
//! - `smoke`: exercise the inventory and transaction collections end to end
//! - `seed`: load the demo catalogue into an empty inventory

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use quantii_infra::{AppConfig, StoreBackend, connect};
use quantii_observability::LogFormat;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "quantii", author, version, about = "Diagnostics for the Quantii point of sale")]
struct Cli {
    /// Use this SQLite database instead of the configured store
    #[arg(long, global = true, value_name = "URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write, read back and delete one document
    Check,
    /// Add, list and remove test inventory items and transactions
    Smoke,
    /// Seed the demo catalogue if the inventory is empty
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    quantii_observability::init_with(LogFormat::Compact);

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.database_url {
        config.store = StoreBackend::Sqlite { url };
    }

    tracing::debug!(store = ?config.store, "connecting");
    let store = match connect(&config.store).await {
        Ok(store) => store,
        Err(e) => {
            println!("store unreachable: {e}");
            if let Some(hint) = commands::remedy_for(&e.to_string()) {
                println!("{hint}");
            }
            std::process::exit(1);
        }
    };

    let healthy = match cli.command {
        Commands::Check => commands::run_check(store.as_ref()).await,
        Commands::Smoke => commands::run_smoke(store).await?,
        Commands::Seed => commands::run_seed(store).await?,
    };

    if !healthy {
        std::process::exit(1);
    }
    Ok(())
}
