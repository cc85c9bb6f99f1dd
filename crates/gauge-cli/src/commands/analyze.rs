//! Full analysis report

use anyhow::Result;

use gauge_core::{InsightKind, Severity};

use super::load_inputs;
use crate::cli::InputArgs;

pub fn cmd_analyze(input: &InputArgs, json: bool) -> Result<()> {
    let (ctx, engine) = load_inputs(input)?;
    let report = engine.analyze(&ctx);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Gauge Report for {}", report.generated_for);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Health: {:.0}/100 ({})",
        report.health.overall, report.health.grade
    );
    for factor in &report.health.factors {
        println!(
            "     {:<16} {:>5.0}  [{}]  {}",
            factor.name,
            factor.value,
            factor.status.as_str(),
            factor.tip
        );
    }

    if !report.category_spending.is_empty() {
        println!();
        println!("   This month by category:");
        for cat in report.category_spending.iter().take(8) {
            println!(
                "     {:<20} ${:>10.2}  ({:.0}%)",
                cat.category,
                cat.amount,
                cat.share * 100.0
            );
        }
    }

    println!();
    println!(
        "   Burn rate: {} ({})",
        report.velocity.burn_rate.as_str(),
        report.velocity.suggestion
    );
    if let Some(days) = report.velocity.days_until_budget_depleted {
        println!("   Budget runs out in ~{} days at this pace", days);
    }

    if report.insights.is_empty() {
        println!();
        println!("   No insights - nothing out of the ordinary.");
    } else {
        println!();
        println!("   Insights:");
        for insight in &report.insights {
            let marker = match insight.severity {
                Severity::Alert => "🔴",
                Severity::Warning => "🟠",
                Severity::Attention => "🟡",
                Severity::Info => "🔵",
            };
            print!("     {} {} - {}", marker, insight.title, insight.message);
            if insight.kind == InsightKind::Savings {
                if let Some(value) = insight.value {
                    print!(" (${:.2} recoverable)", value);
                }
            }
            println!();
        }
    }

    println!();
    println!(
        "   {} alerts · {} tips · ${:.2} potential savings",
        report.stats.alerts, report.stats.active_tips, report.stats.potential_savings
    );
    println!();

    Ok(())
}
