//! Ledger normalizer
//!
//! Cleans and buckets raw transactions before any estimator runs:
//! calendar-month buckets per category, current-month category totals,
//! trailing-30-day weekday totals, and window income/expense sums.
//! Buckets are recomputed fresh on every invocation, never patched
//! incrementally.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::context::AnalysisContext;
use crate::models::{CategorySpending, Transaction, TxKind};

/// Sentinel category for records with a missing or empty category.
/// Every expense is attributable to exactly one category bucket.
pub const OTHER_CATEGORY: &str = "Other";

/// Calendar month key, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

// Serialized as "YYYY-MM" so month maps stay valid JSON objects
impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Expense sums for one calendar month
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthlyBucket {
    pub total: f64,
    pub by_category: BTreeMap<String, f64>,
}

/// Normalized view of the ledger for one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    /// Expense buckets keyed by calendar month, oldest first
    pub months: BTreeMap<MonthKey, MonthlyBucket>,
    pub current_month: MonthKey,
    /// Current-month category totals, largest first
    pub category_spending: Vec<CategorySpending>,
    pub current_month_expense: f64,
    pub current_month_income: f64,
    /// Trailing-30-day expense totals per weekday, Monday..Sunday
    pub weekday_expense: [f64; 7],
    /// Window-wide sums (after the history cap)
    pub window_income: f64,
    pub window_expense: f64,
    /// In-window transactions of both kinds, sorted by (date, id)
    pub transactions: Vec<Transaction>,
    pub today: NaiveDate,
}

impl LedgerView {
    /// Build the normalized view. Total over any input: malformed
    /// categories are coerced, zero amounts are excluded, nothing errors.
    pub fn build(ctx: &AnalysisContext, config: &AnalyticsConfig) -> Self {
        let today = ctx.today;
        let window_start = today - Months::new(config.history_cap_months);
        let weekday_start = today - Days::new(30);
        let current_month = MonthKey::of(today);

        let mut transactions: Vec<Transaction> = ctx
            .transactions
            .iter()
            .filter(|tx| {
                if tx.amount <= 0.0 {
                    debug!(id = %tx.id, "excluding non-positive amount");
                    return false;
                }
                tx.date >= window_start && tx.date <= today
            })
            .cloned()
            .collect();
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let mut months: BTreeMap<MonthKey, MonthlyBucket> = BTreeMap::new();
        let mut weekday_expense = [0.0f64; 7];
        let mut window_income = 0.0;
        let mut window_expense = 0.0;
        let mut current_month_income = 0.0;

        for tx in &transactions {
            let in_current_month = MonthKey::of(tx.date) == current_month;

            match tx.kind {
                TxKind::Income => {
                    window_income += tx.amount;
                    if in_current_month {
                        current_month_income += tx.amount;
                    }
                }
                TxKind::Expense => {
                    window_expense += tx.amount;

                    let bucket = months.entry(MonthKey::of(tx.date)).or_default();
                    bucket.total += tx.amount;
                    *bucket
                        .by_category
                        .entry(category_of(tx).to_string())
                        .or_insert(0.0) += tx.amount;

                    if tx.date > weekday_start {
                        weekday_expense[tx.date.weekday().num_days_from_monday() as usize] +=
                            tx.amount;
                    }
                }
            }
        }

        let (category_spending, current_month_expense) = match months.get(&current_month) {
            Some(bucket) => {
                let mut spending: Vec<CategorySpending> = bucket
                    .by_category
                    .iter()
                    .map(|(category, amount)| CategorySpending {
                        category: category.clone(),
                        amount: *amount,
                        share: if bucket.total > 0.0 {
                            amount / bucket.total
                        } else {
                            0.0
                        },
                    })
                    .collect();
                spending.sort_by(|a, b| {
                    b.amount
                        .partial_cmp(&a.amount)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.category.cmp(&b.category))
                });
                (spending, bucket.total)
            }
            None => (Vec::new(), 0.0),
        };

        debug!(
            months = months.len(),
            transactions = transactions.len(),
            "ledger normalized"
        );

        Self {
            months,
            current_month,
            category_spending,
            current_month_expense,
            current_month_income,
            weekday_expense,
            window_income,
            window_expense,
            transactions,
            today,
        }
    }

    /// Month-to-date spend for one category
    pub fn current_month_category(&self, category: &str) -> f64 {
        self.months
            .get(&self.current_month)
            .and_then(|bucket| bucket.by_category.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    /// Distinct expense categories across the window
    pub fn distinct_categories(&self) -> usize {
        let mut seen: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for bucket in self.months.values() {
            seen.extend(bucket.by_category.keys().map(String::as_str));
        }
        seen.len()
    }
}

/// Coerce a transaction's category to a flat string, applying the sentinel
pub fn category_of(tx: &Transaction) -> &str {
    match tx.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => OTHER_CATEGORY,
    }
}

/// Normalized merchant key: lowercase, non-alphanumerics stripped to
/// spaces, first 3 tokens. Tolerates trailing transaction IDs and
/// punctuation drift while keeping distinct merchants apart.
pub fn merchant_key(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}
