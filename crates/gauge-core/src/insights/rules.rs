//! The built-in insight rules
//!
//! Each rule checks one condition and emits zero or one insight. Rules
//! only read upstream signals through [`RuleContext`]; none of them
//! recompute aggregates on their own.

use crate::ledger::merchant_key;
use crate::models::{AnomalyKind, TxKind};
use crate::trend::TrendDirection;
use crate::velocity::BurnRate;

use super::engine::RuleContext;
use super::types::{Insight, InsightKind, Severity};

/// Bills due within this many days feed the due-soon insight
const DUE_SOON_DAYS: i64 = 7;

pub trait InsightRule {
    /// Stable identifier, also used as the emitted insight's id
    fn id(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight>;
}

/// Top category takes more than its fair share of the month's spend
pub struct TopCategoryRule;

impl InsightRule for TopCategoryRule {
    fn id(&self) -> &'static str {
        "top-category"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        if ctx.view.category_spending.len() < 2 {
            return None;
        }
        let top = &ctx.view.category_spending[0];
        if top.share <= ctx.config.top_category_share {
            return None;
        }

        Some(
            Insight::new(
                self.id(),
                InsightKind::Tip,
                Severity::Attention,
                "One category dominates",
                format!(
                    "{} is {:.0}% of this month's spending (${:.2}).",
                    top.category,
                    top.share * 100.0,
                    top.amount
                ),
            )
            .with_action("Review category", "categories")
            .with_look("chart-pie", "amber"),
        )
    }
}

/// Weekends carry an outsized share of the trailing month's spend
pub struct WeekendSpendRule;

impl InsightRule for WeekendSpendRule {
    fn id(&self) -> &'static str {
        "weekend-spend"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let total: f64 = ctx.view.weekday_expense.iter().sum();
        if total <= 0.0 {
            return None;
        }
        // Monday-indexed: Saturday and Sunday are the last two slots
        let weekend = ctx.view.weekday_expense[5] + ctx.view.weekday_expense[6];
        let share = weekend / total;
        if share <= ctx.config.weekend_share {
            return None;
        }

        Some(
            Insight::new(
                self.id(),
                InsightKind::Tip,
                Severity::Attention,
                "Weekend-heavy spending",
                format!(
                    "{:.0}% of the last 30 days' spending (${:.2}) landed on weekends.",
                    share * 100.0,
                    weekend
                ),
            )
            .with_look("calendar", "amber"),
        )
    }
}

/// Savings rate below the configured floor
pub struct LowSavingsRule;

impl InsightRule for LowSavingsRule {
    fn id(&self) -> &'static str {
        "low-savings-rate"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        if ctx.view.window_income <= 0.0 {
            return None;
        }
        let rate = (ctx.view.window_income - ctx.view.window_expense) / ctx.view.window_income
            * 100.0;
        if rate >= ctx.config.savings_rate_floor {
            return None;
        }

        Some(
            Insight::new(
                self.id(),
                InsightKind::Warning,
                Severity::Warning,
                "Low savings rate",
                format!(
                    "You're keeping {:.1}% of income; aim for at least {:.0}%.",
                    rate.max(0.0),
                    ctx.config.savings_rate_floor
                ),
            )
            .with_action("Set a savings goal", "goals"),
        )
    }
}

/// A goal whose deadline is close while its balance is short
pub struct GoalDeadlineRule;

/// Days before a goal deadline at which the shortfall warning fires
const GOAL_DEADLINE_DAYS: i64 = 30;

impl InsightRule for GoalDeadlineRule {
    fn id(&self) -> &'static str {
        "goal-deadline"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let at_risk = ctx.goals.iter().find(|g| {
            let Some(deadline) = g.deadline else {
                return false;
            };
            g.saved < g.target && (deadline - ctx.view.today).num_days() <= GOAL_DEADLINE_DAYS
        })?;

        let shortfall = at_risk.target - at_risk.saved;
        let deadline = at_risk.deadline.expect("filtered on deadline");

        Some(
            Insight::new(
                self.id(),
                InsightKind::Warning,
                Severity::Warning,
                "Goal deadline at risk",
                format!(
                    "\"{}\" is ${:.2} short of its ${:.2} target due {}.",
                    at_risk.name,
                    shortfall,
                    at_risk.target,
                    crate::models::human_date(deadline)
                ),
            )
            .with_action("Review goal", "goals")
            .with_look("target", "red"),
        )
    }
}

/// Active subscriptions with no matching ledger activity
pub struct IdleSubscriptionRule;

impl InsightRule for IdleSubscriptionRule {
    fn id(&self) -> &'static str {
        "idle-subscriptions"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let grace = ctx.config.idle_subscription_grace_days;

        let idle: Vec<_> = ctx
            .subscriptions
            .iter()
            .filter(|sub| sub.is_active)
            .filter(|sub| {
                let key = merchant_key(&sub.name);
                if key.is_empty() {
                    return false;
                }
                let horizon = match sub.cycle {
                    crate::models::BillingCycle::Weekly => 7 + grace,
                    crate::models::BillingCycle::Monthly => 30 + grace,
                    crate::models::BillingCycle::Yearly => 365 + grace,
                };
                !ctx.view.transactions.iter().any(|tx| {
                    tx.kind == TxKind::Expense
                        && (ctx.view.today - tx.date).num_days() <= horizon
                        && merchant_key(&tx.description) == key
                })
            })
            .collect();

        if idle.is_empty() {
            return None;
        }

        let total: f64 = idle.iter().map(|s| s.price).sum();
        let names: Vec<&str> = idle.iter().map(|s| s.name.as_str()).collect();

        Some(
            Insight::new(
                self.id(),
                InsightKind::Savings,
                Severity::Attention,
                "Subscriptions without activity",
                format!(
                    "{} subscription{} with no recent charges in your ledger: {}.",
                    idle.len(),
                    if idle.len() == 1 { "" } else { "s" },
                    names.join(", ")
                ),
            )
            .with_value(total)
            .with_action("Review subscriptions", "subscriptions"),
        )
    }
}

/// Small purchases quietly adding up
pub struct SmallTransactionRule;

impl InsightRule for SmallTransactionRule {
    fn id(&self) -> &'static str {
        "small-transactions"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let month_total = ctx.view.current_month_expense;
        if month_total <= 0.0 {
            return None;
        }

        let current_month = ctx.view.current_month;
        let small: Vec<&crate::models::Transaction> = ctx
            .view
            .transactions
            .iter()
            .filter(|tx| {
                tx.kind == TxKind::Expense
                    && crate::ledger::MonthKey::of(tx.date) == current_month
                    && tx.amount < ctx.config.small_tx_ceiling
            })
            .collect();

        let small_total: f64 = small.iter().map(|tx| tx.amount).sum();
        if small_total <= ctx.config.small_tx_share * month_total {
            return None;
        }

        Some(
            Insight::new(
                self.id(),
                InsightKind::Tip,
                Severity::Attention,
                "Small purchases add up",
                format!(
                    "{} purchases under ${:.0} total ${:.2} this month ({:.0}% of spending).",
                    small.len(),
                    ctx.config.small_tx_ceiling,
                    small_total,
                    small_total / month_total * 100.0
                ),
            )
            .with_value(small_total),
        )
    }
}

/// One or more budget categories over their limit
pub struct BudgetBreachRule;

impl InsightRule for BudgetBreachRule {
    fn id(&self) -> &'static str {
        "budget-breach"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let breached: Vec<_> = ctx
            .anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::BudgetExceeded)
            .collect();

        if breached.is_empty() {
            return None;
        }

        let overage: f64 = breached.iter().map(|a| a.actual - a.expected).sum();
        let message = if breached.len() == 1 {
            format!(
                "{} is ${:.2} over its monthly budget.",
                breached[0].category, overage
            )
        } else {
            format!(
                "{} categories are over budget by ${:.2} combined.",
                breached.len(),
                overage
            )
        };

        Some(
            Insight::new(
                self.id(),
                InsightKind::Warning,
                Severity::Alert,
                "Over budget",
                message,
            )
            .with_value(overage)
            .with_action("Adjust budgets", "budgets"),
        )
    }
}

/// Month-end projection is past the fast-burn band
pub struct FastBurnRule;

impl InsightRule for FastBurnRule {
    fn id(&self) -> &'static str {
        "fast-burn"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        if ctx.velocity.burn_rate != BurnRate::Fast {
            return None;
        }
        let budget = ctx.velocity.budget_total?;
        let overshoot = ctx.velocity.projected_month_end - budget;

        Some(
            Insight::new(
                self.id(),
                InsightKind::Warning,
                Severity::Warning,
                "Spending pace is high",
                format!(
                    "At ${:.2}/day you'll end the month ${:.0} past your budget.",
                    ctx.velocity.daily_rate, overshoot
                ),
            )
            .with_value(overshoot)
            .with_action("See projection", "velocity"),
        )
    }
}

/// Steepest rising category, when one is genuinely rising
pub struct RisingTrendRule;

impl InsightRule for RisingTrendRule {
    fn id(&self) -> &'static str {
        "rising-trend"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        // Trends arrive steepest-first
        let rising = ctx
            .trends
            .iter()
            .find(|t| t.direction == TrendDirection::Up)?;

        Some(Insight::new(
            self.id(),
            InsightKind::Info,
            Severity::Info,
            "Category trending up",
            format!(
                "{} has grown about {:.0}% per month over the last {} months.",
                rising.category, rising.slope_pct, rising.months
            ),
        ))
    }
}

/// Bills landing inside the next week
pub struct BillsDueSoonRule;

impl InsightRule for BillsDueSoonRule {
    fn id(&self) -> &'static str {
        "bills-due-soon"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let due: Vec<_> = ctx
            .bills
            .iter()
            .filter(|b| (0..=DUE_SOON_DAYS).contains(&(b.due_date - ctx.view.today).num_days()))
            .collect();

        if due.is_empty() {
            return None;
        }

        let total: f64 = due.iter().map(|b| b.amount).sum();
        // Bills arrive due-date sorted
        let first = due[0];
        let last = due[due.len() - 1];

        Some(
            Insight::new(
                self.id(),
                InsightKind::Info,
                Severity::Info,
                "Bills due this week",
                format!(
                    "{} bill{} totaling ${:.2} due by {}, starting with {}.",
                    due.len(),
                    if due.len() == 1 { "" } else { "s" },
                    total,
                    crate::models::human_date(last.due_date),
                    first.name
                ),
            )
            .with_value(total)
            .with_look("receipt", "blue"),
        )
    }
}
