//! Recurring charges and upcoming bills

use anyhow::Result;

use super::load_inputs;
use crate::cli::InputArgs;

pub fn cmd_bills(input: &InputArgs, json: bool) -> Result<()> {
    let (ctx, engine) = load_inputs(input)?;
    let report = engine.analyze(&ctx);

    if json {
        let out = serde_json::json!({
            "recurring": report.recurring,
            "upcoming_bills": report.upcoming_bills,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("🔁 Recurring charges");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.recurring.is_empty() {
        println!("   None detected.");
    }
    for pattern in &report.recurring {
        println!(
            "   {:<28} {:>9} ${:>8.2}  next {}  ({}% confidence{})",
            pattern.display_name,
            pattern.frequency.as_str(),
            pattern.average_amount,
            pattern.next_date,
            pattern.confidence,
            if pattern.is_subscription {
                ", subscription"
            } else {
                ""
            }
        );
    }

    println!();
    println!("📅 Upcoming bills");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.upcoming_bills.is_empty() {
        println!("   Nothing coming up.");
    }
    for bill in &report.upcoming_bills {
        println!(
            "   {}  {:<28} ${:>8.2}  [{}]",
            bill.due_date,
            bill.name,
            bill.amount,
            bill.source.as_str()
        );
    }
    println!();

    Ok(())
}
