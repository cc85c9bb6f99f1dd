//! Core types for the insight synthesizer

use serde::Serialize;
use std::fmt;

/// What an insight is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Something is wrong or about to be
    Warning,
    /// Money recoverable by acting
    Savings,
    /// A habit worth adjusting
    Tip,
    /// Worth knowing, no action implied
    Info,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Savings => "savings",
            InsightKind::Tip => "tip",
            InsightKind::Info => "info",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgent an insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth attention but not urgent
    Attention,
    /// Should be addressed soon
    Warning,
    /// Requires immediate attention
    Alert,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Attention => 2,
            Severity::Warning => 3,
            Severity::Alert => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A synthesized, human-readable recommendation or alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    /// Stable identifier of the rule that produced this insight
    pub id: String,
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Currency amount attached to the insight, when one applies
    pub value: Option<f64>,
    /// Suggested action label
    pub action: Option<String>,
    /// Navigation target for the action
    pub action_target: Option<String>,
    pub icon: String,
    pub color: String,
}

impl Insight {
    pub fn new(
        id: impl Into<String>,
        kind: InsightKind,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let (icon, color) = default_look(kind);
        Self {
            id: id.into(),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            value: None,
            action: None,
            action_target: None,
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>, target: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self.action_target = Some(target.into());
        self
    }

    pub fn with_look(mut self, icon: impl Into<String>, color: impl Into<String>) -> Self {
        self.icon = icon.into();
        self.color = color.into();
        self
    }
}

fn default_look(kind: InsightKind) -> (&'static str, &'static str) {
    match kind {
        InsightKind::Warning => ("alert-triangle", "red"),
        InsightKind::Savings => ("piggy-bank", "green"),
        InsightKind::Tip => ("lightbulb", "amber"),
        InsightKind::Info => ("info-circle", "blue"),
    }
}

/// Aggregate stats over an emitted insight list.
///
/// Always derived by folding over the list, never computed independently,
/// so the headline numbers cannot drift from what is displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightStats {
    pub potential_savings: f64,
    pub active_tips: usize,
    pub alerts: usize,
    pub health_score: f64,
}

impl InsightStats {
    pub fn from_insights(insights: &[Insight], health_score: f64) -> Self {
        let potential_savings = insights
            .iter()
            .filter(|i| matches!(i.kind, InsightKind::Savings | InsightKind::Tip))
            .filter_map(|i| i.value)
            .sum();
        let active_tips = insights
            .iter()
            .filter(|i| i.kind == InsightKind::Tip)
            .count();
        let alerts = insights
            .iter()
            .filter(|i| i.kind == InsightKind::Warning)
            .count();

        Self {
            potential_savings,
            active_tips,
            alerts,
            health_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_priority_ordering() {
        assert!(Severity::Alert.priority() > Severity::Warning.priority());
        assert!(Severity::Warning.priority() > Severity::Attention.priority());
        assert!(Severity::Attention.priority() > Severity::Info.priority());
    }

    #[test]
    fn test_insight_builder() {
        let insight = Insight::new(
            "test-rule",
            InsightKind::Savings,
            Severity::Warning,
            "Test Title",
            "Test message",
        )
        .with_value(42.0)
        .with_action("Review subscriptions", "subscriptions");

        assert_eq!(insight.id, "test-rule");
        assert_eq!(insight.value, Some(42.0));
        assert_eq!(insight.action_target.as_deref(), Some("subscriptions"));
        assert_eq!(insight.icon, "piggy-bank");
    }

    #[test]
    fn test_stats_fold_from_fixed_list() {
        let insights = vec![
            Insight::new("a", InsightKind::Warning, Severity::Alert, "t", "m"),
            Insight::new("b", InsightKind::Warning, Severity::Warning, "t", "m").with_value(10.0),
            Insight::new("c", InsightKind::Savings, Severity::Attention, "t", "m").with_value(25.0),
            Insight::new("d", InsightKind::Tip, Severity::Info, "t", "m").with_value(5.0),
            Insight::new("e", InsightKind::Tip, Severity::Info, "t", "m"),
            Insight::new("f", InsightKind::Info, Severity::Info, "t", "m").with_value(99.0),
        ];

        let stats = InsightStats::from_insights(&insights, 72.0);

        assert_eq!(stats.alerts, 2);
        assert_eq!(stats.active_tips, 2);
        // Savings + valued tips; warning and info values do not count
        assert!((stats.potential_savings - 30.0).abs() < 1e-9);
        assert_eq!(stats.health_score, 72.0);
    }
}
