//! Analysis context
//!
//! The explicit input bundle for one engine invocation. The calling layer
//! fetches everything ahead of time; the engine never reaches out to a
//! store, an API, or the system clock. Same context in, same report out.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Budget, Goal, Subscription, Transaction};

/// Everything one analysis run is allowed to see
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisContext {
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub subscriptions: Vec<Subscription>,
    /// Injected wall-clock date; core logic never reads the system clock
    pub today: NaiveDate,
}

impl AnalysisContext {
    pub fn new(
        transactions: Vec<Transaction>,
        budgets: Vec<Budget>,
        goals: Vec<Goal>,
        subscriptions: Vec<Subscription>,
        today: NaiveDate,
    ) -> Self {
        Self {
            transactions,
            budgets,
            goals,
            subscriptions,
            today,
        }
    }

    /// A new user with no history. Treated identically to a collaborator
    /// fetch failure upstream: empty-state outputs, not errors.
    pub fn empty(today: NaiveDate) -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new(), today)
    }
}
