//! Analytics engine façade
//!
//! Wires the pipeline together: normalizer, then the four estimators,
//! then the health composer, then insight synthesis. One call, one
//! report. Pure with respect to the context: same inputs and the same
//! injected date always produce the same report.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::anomaly::AnomalyDetector;
use crate::cache::{fingerprint, MemoCache};
use crate::config::AnalyticsConfig;
use crate::context::AnalysisContext;
use crate::health::HealthScoreComposer;
use crate::insights::{Insight, InsightEngine, InsightStats, RuleContext};
use crate::ledger::LedgerView;
use crate::models::{Anomaly, CategorySpending, HealthScore, RecurringPattern, UpcomingBill};
use crate::recurring::RecurrenceDetector;
use crate::trend::{estimate_trends, CategoryTrend};
use crate::velocity::{self, Velocity};

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The injected "today" the report was computed against
    pub generated_for: NaiveDate,
    pub category_spending: Vec<CategorySpending>,
    pub trends: Vec<CategoryTrend>,
    pub recurring: Vec<RecurringPattern>,
    pub upcoming_bills: Vec<UpcomingBill>,
    pub anomalies: Vec<Anomaly>,
    pub velocity: Velocity,
    pub health: HealthScore,
    pub insights: Vec<Insight>,
    pub stats: InsightStats,
}

/// The engine. Holds configuration and the memo cache; everything else is
/// per-call.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    memo: MemoCache,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::with_config(AnalyticsConfig::default())
    }

    pub fn with_config(config: AnalyticsConfig) -> Self {
        let memo = MemoCache::new(Duration::from_secs(config.memo_ttl_secs));
        Self { config, memo }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Run the full pipeline, via the memo cache when the inputs are
    /// unchanged. Total over any input: empty collections come back as
    /// empty-state outputs, never errors.
    pub fn analyze(&self, ctx: &AnalysisContext) -> AnalysisReport {
        let key = fingerprint(ctx, &self.config);
        if let Some(report) = self.memo.get(&key) {
            debug!("memo hit, returning cached report");
            return report;
        }

        let report = self.compute(ctx);
        self.memo.put(key, report.clone());
        report
    }

    /// Invalidation hook for the caller's change-notification layer
    pub fn invalidate(&self) {
        self.memo.invalidate();
    }

    fn compute(&self, ctx: &AnalysisContext) -> AnalysisReport {
        let view = LedgerView::build(ctx, &self.config);

        let trends = estimate_trends(&view);

        let detector = RecurrenceDetector::new(&self.config);
        let recurring = detector.detect(&view);
        let upcoming_bills = detector.upcoming_bills(&ctx.subscriptions, &recurring, &view);

        let anomalies = AnomalyDetector::new(&self.config).detect(&view, &ctx.budgets);

        let total_budget: f64 = ctx
            .budgets
            .iter()
            .filter(|b| b.amount > 0.0)
            .map(|b| b.amount)
            .sum();
        let velocity = velocity::project(
            &view,
            (total_budget > 0.0).then_some(total_budget),
            &self.config,
        );

        let health = HealthScoreComposer::new(&self.config).compose(ctx, &view);

        let rule_ctx = RuleContext {
            view: &view,
            subscriptions: &ctx.subscriptions,
            goals: &ctx.goals,
            trends: &trends,
            patterns: &recurring,
            bills: &upcoming_bills,
            anomalies: &anomalies,
            velocity: &velocity,
            health: &health,
            config: &self.config,
        };
        let insights = InsightEngine::new().analyze(&rule_ctx);
        let stats = InsightStats::from_insights(&insights, health.overall);

        info!(
            transactions = view.transactions.len(),
            patterns = recurring.len(),
            anomalies = anomalies.len(),
            insights = insights.len(),
            health = health.overall,
            "analysis complete"
        );

        AnalysisReport {
            generated_for: ctx.today,
            category_spending: view.category_spending.clone(),
            trends,
            recurring,
            upcoming_bills,
            anomalies,
            velocity,
            health,
            insights,
            stats,
        }
    }
}
