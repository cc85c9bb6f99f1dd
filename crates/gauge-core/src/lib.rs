//! Gauge Core Library
//!
//! Financial behavior analytics for the Gauge personal finance tool:
//! - Ledger normalization into month/category/weekday buckets
//! - Month-over-month category trend estimation
//! - Recurring charge detection with next-occurrence prediction
//! - Rolling-baseline and budget anomaly detection
//! - Burn-rate projection
//! - Composite health scoring
//! - Rule-based insight synthesis with consistent aggregate stats
//!
//! The engine is synchronous, deterministic, and pure with respect to its
//! inputs: the caller fetches everything (ledger, budgets, goals,
//! subscriptions) and injects "today"; identical inputs always produce
//! identical reports. A short-TTL memo cache is the only shared state,
//! and it is performance-only.

pub mod anomaly;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod health;
pub mod import;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod recurring;
pub mod trend;
pub mod velocity;

pub use anomaly::AnomalyDetector;
pub use config::{AnalyticsConfig, GapBand, HealthWeights};
pub use context::AnalysisContext;
pub use engine::{AnalysisReport, AnalyticsEngine};
pub use error::{Error, Result};
pub use health::HealthScoreComposer;
pub use insights::{Insight, InsightEngine, InsightKind, InsightStats, Severity};
pub use ledger::{merchant_key, LedgerView, MonthKey, OTHER_CATEGORY};
pub use models::{
    Anomaly, AnomalyKind, AnomalySeverity, BillSource, BillingCycle, Budget, BudgetPeriod,
    CategorySpending, FactorStatus, Frequency, Goal, Grade, HealthFactor, HealthScore,
    RecurringPattern, Subscription, Transaction, TxKind, UpcomingBill,
};
pub use recurring::RecurrenceDetector;
pub use trend::{CategoryTrend, TrendDirection};
pub use velocity::{BurnRate, Velocity};
