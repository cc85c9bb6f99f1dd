//! Data models for Gauge
//!
//! Input records arrive from the calling layer (store fetch, CSV/JSON
//! import) and are read-only to the engine. Derived records are produced
//! fresh on every analysis run and never persisted here.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a transaction adds to or draws from the user's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

/// A ledger transaction
///
/// `amount` is a positive magnitude; direction is carried by `kind`.
/// `category` is optional at the boundary and coerced to a sentinel by the
/// ledger normalizer, so downstream components always see a flat string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: TxKind,
    #[serde(default)]
    pub category: Option<String>,
    pub description: String,
}

/// Budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
}

impl Default for BudgetPeriod {
    fn default() -> Self {
        Self::Monthly
    }
}

/// A per-category spending limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub period: BudgetPeriod,
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target: f64,
    pub saved: f64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Billing cycle of an explicitly-tracked subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Advance a date by one billing cycle. Monthly and yearly use calendar
    /// month arithmetic, not fixed day counts.
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => date + Days::new(7),
            Self::Monthly => date + Months::new(1),
            Self::Yearly => date + Months::new(12),
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown billing cycle: {}", s)),
        }
    }
}

/// A subscription tracked explicitly by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub price: f64,
    pub cycle: BillingCycle,
    #[serde(default)]
    pub is_trial: bool,
    pub is_active: bool,
    #[serde(default)]
    pub next_payment_date: Option<NaiveDate>,
}

/// Periodicity class inferred from the average day-gap between
/// same-merchant transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Nominal period length in days, used only for display and banding.
    /// Date prediction goes through [`Frequency::advance`].
    pub fn period_hint_days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 91,
            Self::Yearly => 365,
        }
    }

    /// Advance a date by one period. Weekly and biweekly are literal day
    /// counts; monthly, quarterly and yearly use calendar month arithmetic
    /// so "the 1st of each month" stays on the 1st.
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => date + Days::new(7),
            Self::Biweekly => date + Days::new(14),
            Self::Monthly => date + Months::new(1),
            Self::Quarterly => date + Months::new(3),
            Self::Yearly => date + Months::new(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring charge detected from ledger history
///
/// `is_subscription` is a heuristic (keyword match or a high-confidence
/// monthly cadence), not a certainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPattern {
    /// Normalized merchant key the pattern was grouped under
    pub merchant_key: String,
    /// Most common raw description, for display
    pub display_name: String,
    pub frequency: Frequency,
    pub average_amount: f64,
    pub last_date: NaiveDate,
    pub next_date: NaiveDate,
    /// Interval regularity, 0-100
    pub confidence: u8,
    pub occurrences: usize,
    pub is_subscription: bool,
}

/// Where an upcoming bill came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillSource {
    /// Explicitly tracked by the user
    Subscription,
    /// Predicted from ledger history
    Prediction,
}

impl BillSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Prediction => "prediction",
        }
    }
}

/// A merged upcoming bill (explicit subscriptions + predictions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingBill {
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub source: BillSource,
    pub confidence: u8,
}

/// How far outside normal an anomaly is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of deviation was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A single transaction far above its rolling baseline
    Transaction,
    /// A budget category at 90-100% of its monthly limit
    BudgetApproaching,
    /// A budget category over its monthly limit
    BudgetExceeded,
}

/// A flagged deviation from a rolling baseline or budget limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub category: String,
    pub actual: f64,
    pub expected: f64,
    pub severity: AnomalySeverity,
    pub kind: AnomalyKind,
    pub description: String,
}

/// Letter grade band over the overall health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status band of a single health factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Good,
    Fair,
    Poor,
}

impl FactorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

/// One weighted component of the health score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthFactor {
    pub name: String,
    pub weight: f64,
    /// Clamped to [0, 100] before weighting
    pub value: f64,
    pub status: FactorStatus,
    pub tip: String,
}

/// Composite financial health score, recomputed whole on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Weighted factor sum, clamped to [0, 100]
    pub overall: f64,
    pub grade: Grade,
    pub factors: Vec<HealthFactor>,
}

/// Current-month spending for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub amount: f64,
    /// Fraction of the month's total expense, 0-1
    pub share: f64,
}

/// Format a date the way report text does
pub(crate) fn human_date(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date.month()), date.day(), date.year())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}
