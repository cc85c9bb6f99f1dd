//! Input loading shared by every command
//!
//! All I/O lives here: the engine itself only ever sees materialized
//! lists and an injected date.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use gauge_core::{import, AnalysisContext, AnalyticsConfig, AnalyticsEngine};

use crate::cli::InputArgs;

/// Load the ledger and companion files into an analysis context plus a
/// configured engine
pub fn load_inputs(args: &InputArgs) -> Result<(AnalysisContext, AnalyticsEngine)> {
    let config = match &args.config {
        Some(path) => AnalyticsConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalyticsConfig::default(),
    };

    let transactions = load_ledger(&args.ledger)?;

    let budgets = match &args.budgets {
        Some(path) => import::parse_budgets_json(open(path)?)
            .with_context(|| format!("parsing budgets from {}", path.display()))?,
        None => Vec::new(),
    };
    let goals = match &args.goals {
        Some(path) => import::parse_goals_json(open(path)?)
            .with_context(|| format!("parsing goals from {}", path.display()))?,
        None => Vec::new(),
    };
    let subscriptions = match &args.subscriptions {
        Some(path) => import::parse_subscriptions_json(open(path)?)
            .with_context(|| format!("parsing subscriptions from {}", path.display()))?,
        None => Vec::new(),
    };

    // The one wall-clock read in the repo; everything below the CLI gets
    // the date injected
    let today = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    tracing::debug!(
        transactions = transactions.len(),
        budgets = budgets.len(),
        goals = goals.len(),
        subscriptions = subscriptions.len(),
        %today,
        "inputs loaded"
    );

    let ctx = AnalysisContext::new(transactions, budgets, goals, subscriptions, today);
    Ok((ctx, AnalyticsEngine::with_config(config)))
}

fn load_ledger(path: &Path) -> Result<Vec<gauge_core::Transaction>> {
    let file = open(path)?;
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let transactions = if is_csv {
        import::parse_ledger_csv(file)
    } else {
        import::parse_ledger_json(file)
    }
    .with_context(|| format!("parsing ledger from {}", path.display()))?;

    Ok(transactions)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}
