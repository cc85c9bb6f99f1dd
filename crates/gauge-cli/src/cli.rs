//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Gauge - Financial behavior analytics for your ledger
#[derive(Parser)]
#[command(name = "gauge")]
#[command(about = "Turn a transaction ledger into trends, bills, anomalies and a health score", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input files shared by every command
#[derive(Args)]
pub struct InputArgs {
    /// Transaction ledger: .csv (date,description,amount,type,category)
    /// or .json (array of transaction objects)
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// Budgets JSON file
    #[arg(long)]
    pub budgets: Option<PathBuf>,

    /// Goals JSON file
    #[arg(long)]
    pub goals: Option<PathBuf>,

    /// Subscriptions JSON file
    #[arg(long)]
    pub subscriptions: Option<PathBuf>,

    /// Analytics config override (TOML); defaults apply otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analyze as of this date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full analysis: health score, category spending, ranked insights
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Emit the full report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recurring charges and merged upcoming bills
    Bills {
        #[command(flatten)]
        input: InputArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Transactions and budget categories outside their baseline
    Anomalies {
        #[command(flatten)]
        input: InputArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
