//! Spending velocity projection
//!
//! Daily burn rate from the current month's elapsed days, a straight-line
//! month-end projection, and days until a total budget runs out.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::ledger::LedgerView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnRate {
    Fast,
    Normal,
    Slow,
}

impl BurnRate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
        }
    }
}

/// Current-month spending pace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Velocity {
    pub daily_rate: f64,
    pub projected_month_end: f64,
    pub budget_total: Option<f64>,
    pub budget_remaining: Option<f64>,
    /// None when there is no budget, no spend, or the budget is already gone
    pub days_until_budget_depleted: Option<i64>,
    pub burn_rate: BurnRate,
    pub suggestion: String,
}

/// Project month-end spend from the pace so far
pub fn project(view: &LedgerView, total_budget: Option<f64>, config: &AnalyticsConfig) -> Velocity {
    let elapsed = view.today.day().max(1) as f64;
    let daily_rate = view.current_month_expense / elapsed;
    let projected_month_end = daily_rate * days_in_month(view.today) as f64;

    let budget_total = total_budget.filter(|b| *b > 0.0);
    let budget_remaining = budget_total.map(|b| b - view.current_month_expense);

    let days_until_budget_depleted = budget_remaining.and_then(|remaining| {
        if daily_rate > 0.0 && remaining > 0.0 {
            Some((remaining / daily_rate).floor() as i64)
        } else {
            None
        }
    });

    let (burn_rate, suggestion) = match budget_total {
        Some(budget) => {
            let ratio = projected_month_end / budget;
            if ratio > config.burn_fast_ratio {
                (
                    BurnRate::Fast,
                    format!(
                        "On pace to spend ${:.0} against a ${:.0} budget. Trimming ${:.2}/day gets you back on track.",
                        projected_month_end,
                        budget,
                        (projected_month_end - budget) / days_in_month(view.today) as f64
                    ),
                )
            } else if ratio < config.burn_slow_ratio {
                (
                    BurnRate::Slow,
                    format!(
                        "Projected ${:.0} of a ${:.0} budget. Room to put the difference toward a goal.",
                        projected_month_end, budget
                    ),
                )
            } else {
                (
                    BurnRate::Normal,
                    format!(
                        "Projected ${:.0} of a ${:.0} budget. Steady as she goes.",
                        projected_month_end, budget
                    ),
                )
            }
        }
        None => (
            BurnRate::Normal,
            "No total budget set. Add one to track your pace against a target.".to_string(),
        ),
    };

    Velocity {
        daily_rate,
        projected_month_end,
        budget_total,
        budget_remaining,
        days_until_budget_depleted,
        burn_rate,
        suggestion,
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).expect("day 1 always valid");
    let next = first + Months::new(1);
    next.signed_duration_since(first).num_days() as u32
}
