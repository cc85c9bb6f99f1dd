//! Insight synthesis
//!
//! Converts upstream analytic signals into ranked, human-readable insight
//! records. Rule-based: a fixed ordered set of condition checks, each
//! emitting zero or one insight. Aggregate stats are folded from the
//! emitted list so the headline numbers always match what is displayed.

mod engine;
mod rules;
mod types;

pub use engine::{InsightEngine, RuleContext};
pub use rules::InsightRule;
pub use types::{Insight, InsightKind, InsightStats, Severity};
