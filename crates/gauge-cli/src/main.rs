//! Gauge CLI - Ledger analytics from the command line
//!
//! Usage:
//!   gauge analyze --ledger FILE      Full report (health, spending, insights)
//!   gauge bills --ledger FILE        Recurring charges and upcoming bills
//!   gauge anomalies --ledger FILE    Out-of-pattern transactions and budgets

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze { input, json } => commands::cmd_analyze(&input, json),
        Commands::Bills { input, json } => commands::cmd_bills(&input, json),
        Commands::Anomalies { input, json } => commands::cmd_anomalies(&input, json),
    }
}
