//! Composite health score
//!
//! Five weighted factors, each clamped to [0, 100] before weighting, the
//! sum clamped again. An empty ledger gets the fixed neutral score rather
//! than a number computed from nothing; a brand-new user should not open
//! the app to an F.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::context::AnalysisContext;
use crate::ledger::LedgerView;
use crate::models::{FactorStatus, Grade, HealthFactor, HealthScore};

/// Neutral factor value used when a factor has no data to judge
const NEUTRAL_FACTOR: f64 = 50.0;

pub struct HealthScoreComposer<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> HealthScoreComposer<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Compose the score from scratch. Never partially updated.
    ///
    /// The savings-rate factor is computed over the whole capped window,
    /// not just the current month, so a sparse month does not zero it.
    pub fn compose(&self, ctx: &AnalysisContext, view: &LedgerView) -> HealthScore {
        if view.transactions.is_empty() {
            let neutral = self.config.neutral_score;
            return HealthScore {
                overall: neutral,
                grade: grade_for(neutral),
                factors: Vec::new(),
            };
        }

        let weights = &self.config.health_weights;

        let streak = tracking_streak(view);
        let consistency = factor(
            "Consistency",
            weights.consistency,
            (streak as f64 * 12.0).min(100.0),
            "Log something every day to keep the streak alive.",
            "A daily habit makes every other signal sharper.",
        );

        let budget_value = if ctx.budgets.iter().any(|b| b.amount > 0.0) {
            let total: f64 = ctx
                .budgets
                .iter()
                .filter(|b| b.amount > 0.0)
                .map(|b| b.amount)
                .sum();
            let spent: f64 = ctx
                .budgets
                .iter()
                .filter(|b| b.amount > 0.0)
                .map(|b| view.current_month_category(&b.category))
                .sum();
            let percent_used = spent / total * 100.0;
            (100.0 - percent_used).max(0.0)
        } else {
            NEUTRAL_FACTOR
        };
        let budget = factor(
            "Budget adherence",
            weights.budget,
            budget_value,
            "Spending is running hot against your budgets.",
            "Budgets are holding. Nice.",
        );

        let savings_value = if view.window_income > 0.0 {
            ((view.window_income - view.window_expense) / view.window_income * 100.0)
                .clamp(0.0, 100.0)
        } else {
            NEUTRAL_FACTOR
        };
        let savings = factor(
            "Savings rate",
            weights.savings,
            savings_value,
            "Less than a tenth of income is being kept. Look for one recurring cost to cut.",
            "A healthy slice of income is staying put.",
        );

        let activity = factor(
            "Activity",
            weights.activity,
            (view.transactions.len() as f64 * 5.0).min(100.0),
            "A fuller ledger gives better signals. Import or log more history.",
            "Plenty of history to work with.",
        );

        let diversification = factor(
            "Diversification",
            weights.diversification,
            (view.distinct_categories() as f64 * 15.0).min(100.0),
            "Most spending sits in very few categories.",
            "Spending is spread across categories.",
        );

        let factors = vec![consistency, budget, savings, activity, diversification];
        let overall = factors
            .iter()
            .map(|f| f.value * f.weight)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        debug!(overall, streak, "health score composed");

        HealthScore {
            overall,
            grade: grade_for(overall),
            factors,
        }
    }
}

fn factor(name: &str, weight: f64, value: f64, poor_tip: &str, good_tip: &str) -> HealthFactor {
    let value = value.clamp(0.0, 100.0);
    let status = if value >= 70.0 {
        FactorStatus::Good
    } else if value >= 40.0 {
        FactorStatus::Fair
    } else {
        FactorStatus::Poor
    };
    let tip = match status {
        FactorStatus::Good => good_tip,
        _ => poor_tip,
    };
    HealthFactor {
        name: name.to_string(),
        weight,
        value,
        status,
        tip: tip.to_string(),
    }
}

/// Consecutive days with at least one transaction, ending at today or
/// yesterday (grace for a day whose entries are not logged yet)
fn tracking_streak(view: &LedgerView) -> u32 {
    let days: BTreeSet<NaiveDate> = view.transactions.iter().map(|t| t.date).collect();

    let mut cursor = if days.contains(&view.today) {
        view.today
    } else if days.contains(&(view.today - Days::new(1))) {
        view.today - Days::new(1)
    } else {
        return 0;
    };

    let mut streak = 1;
    while days.contains(&(cursor - Days::new(1))) {
        cursor = cursor - Days::new(1);
        streak += 1;
    }
    streak
}

/// Documented, release-stable grade bands
fn grade_for(overall: f64) -> Grade {
    if overall >= 92.0 {
        Grade::APlus
    } else if overall >= 80.0 {
        Grade::A
    } else if overall >= 65.0 {
        Grade::B
    } else if overall >= 50.0 {
        Grade::C
    } else if overall >= 35.0 {
        Grade::D
    } else {
        Grade::F
    }
}
