//! Anomaly listing

use anyhow::Result;

use gauge_core::AnomalySeverity;

use super::load_inputs;
use crate::cli::InputArgs;

pub fn cmd_anomalies(input: &InputArgs, json: bool) -> Result<()> {
    let (ctx, engine) = load_inputs(input)?;
    let report = engine.analyze(&ctx);

    if json {
        println!("{}", serde_json::to_string_pretty(&report.anomalies)?);
        return Ok(());
    }

    println!();
    println!("⚠️  Anomalies");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.anomalies.is_empty() {
        println!("   Nothing outside the usual patterns.");
    }
    for anomaly in &report.anomalies {
        let marker = match anomaly.severity {
            AnomalySeverity::High => "🔴",
            AnomalySeverity::Medium => "🟠",
            AnomalySeverity::Low => "🟡",
        };
        println!("   {} {}  {}", marker, anomaly.date, anomaly.description);
    }
    println!();

    Ok(())
}
