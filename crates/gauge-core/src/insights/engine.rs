//! Insight engine - evaluates the rule set and ranks findings

use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::ledger::LedgerView;
use crate::models::{Anomaly, Goal, HealthScore, RecurringPattern, Subscription, UpcomingBill};
use crate::trend::CategoryTrend;
use crate::velocity::Velocity;

use super::rules::{
    BillsDueSoonRule, BudgetBreachRule, FastBurnRule, GoalDeadlineRule, IdleSubscriptionRule,
    InsightRule, LowSavingsRule, RisingTrendRule, SmallTransactionRule, TopCategoryRule,
    WeekendSpendRule,
};
use super::types::Insight;

/// Everything a rule is allowed to read. All upstream signals are computed
/// before synthesis; rules never recompute them.
pub struct RuleContext<'a> {
    pub view: &'a LedgerView,
    pub subscriptions: &'a [Subscription],
    pub goals: &'a [Goal],
    pub trends: &'a [CategoryTrend],
    pub patterns: &'a [RecurringPattern],
    pub bills: &'a [UpcomingBill],
    pub anomalies: &'a [Anomaly],
    pub velocity: &'a Velocity,
    pub health: &'a HealthScore,
    pub config: &'a AnalyticsConfig,
}

/// The rule registry. Evaluation order is fixed; display order is by
/// severity, then attached value.
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine with the built-in rule set
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(TopCategoryRule));
        engine.register(Box::new(WeekendSpendRule));
        engine.register(Box::new(LowSavingsRule));
        engine.register(Box::new(GoalDeadlineRule));
        engine.register(Box::new(IdleSubscriptionRule));
        engine.register(Box::new(SmallTransactionRule));
        engine.register(Box::new(BudgetBreachRule));
        engine.register(Box::new(FastBurnRule));
        engine.register(Box::new(RisingTrendRule));
        engine.register(Box::new(BillsDueSoonRule));

        engine
    }

    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule and rank the findings
    pub fn analyze(&self, ctx: &RuleContext<'_>) -> Vec<Insight> {
        let mut insights: Vec<Insight> = Vec::new();

        for rule in &self.rules {
            if let Some(insight) = rule.evaluate(ctx) {
                debug!(rule = rule.id(), "insight emitted");
                insights.push(insight);
            }
        }

        insights.sort_by(|a, b| {
            b.severity
                .priority()
                .cmp(&a.severity.priority())
                .then_with(|| {
                    b.value
                        .unwrap_or(0.0)
                        .partial_cmp(&a.value.unwrap_or(0.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        });

        insights
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}
