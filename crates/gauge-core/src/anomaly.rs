//! Anomaly detection
//!
//! Two distinct signals, recomputed whole on every run:
//! - single transactions whose magnitude towers over a rolling baseline of
//!   the preceding same-kind transactions,
//! - budget categories whose month-to-date spend is at or past the limit.
//!
//! The rolling window travels with the call; there is no process-wide
//! state, and deduplicating repeat alerts across runs belongs to the
//! notification layer, not here.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::ledger::{category_of, LedgerView};
use crate::models::{Anomaly, AnomalyKind, AnomalySeverity, Budget, Transaction, TxKind};

pub struct AnomalyDetector<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Run both signals over the normalized view
    pub fn detect(&self, view: &LedgerView, budgets: &[Budget]) -> Vec<Anomaly> {
        let mut anomalies = self.transaction_anomalies(&view.transactions);
        anomalies.extend(self.budget_anomalies(view, budgets));

        anomalies.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.category.cmp(&b.category))
        });

        info!(count = anomalies.len(), "anomaly detection complete");
        anomalies
    }

    /// Flag transactions whose magnitude exceeds `anomaly_multiplier`
    /// times the mean of the preceding same-kind window. Transactions must
    /// be date-sorted; the normalizer guarantees this for its view.
    pub fn transaction_anomalies(&self, transactions: &[Transaction]) -> Vec<Anomaly> {
        let window = self.config.anomaly_window;
        let mut expense_window: VecDeque<f64> = VecDeque::with_capacity(window);
        let mut income_window: VecDeque<f64> = VecDeque::with_capacity(window);
        let mut anomalies = Vec::new();

        for tx in transactions {
            let baseline = match tx.kind {
                TxKind::Expense => &mut expense_window,
                TxKind::Income => &mut income_window,
            };

            if !baseline.is_empty() {
                let mean = baseline.iter().sum::<f64>() / baseline.len() as f64;
                // A zero mean means no usable baseline; sparse histories
                // must not produce degenerate flags
                if mean > 0.0 && tx.amount > self.config.anomaly_multiplier * mean {
                    let ratio = tx.amount / mean;
                    let severity = if ratio > self.config.anomaly_high_multiplier {
                        AnomalySeverity::High
                    } else {
                        AnomalySeverity::Medium
                    };

                    debug!(id = %tx.id, ratio, "transaction anomaly");
                    anomalies.push(Anomaly {
                        date: tx.date,
                        category: category_of(tx).to_string(),
                        actual: tx.amount,
                        expected: mean,
                        severity,
                        kind: AnomalyKind::Transaction,
                        description: format!(
                            "{} of ${:.2} is {:.1}x your recent {} average of ${:.2}",
                            capitalize(tx.kind.as_str()),
                            tx.amount,
                            ratio,
                            tx.kind,
                            mean
                        ),
                    });
                }
            }

            if baseline.len() == window {
                baseline.pop_front();
            }
            baseline.push_back(tx.amount);
        }

        anomalies
    }

    /// Flag budget categories at or past their monthly limit
    fn budget_anomalies(&self, view: &LedgerView, budgets: &[Budget]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for budget in budgets {
            if budget.amount <= 0.0 {
                continue;
            }

            let spent = view.current_month_category(&budget.category);
            let ratio = spent / budget.amount;

            let (kind, severity, description) = if ratio >= 1.0 {
                (
                    AnomalyKind::BudgetExceeded,
                    AnomalySeverity::High,
                    format!(
                        "{} is over budget: ${:.2} spent of ${:.2}",
                        budget.category, spent, budget.amount
                    ),
                )
            } else if ratio >= self.config.budget_warning_ratio {
                (
                    AnomalyKind::BudgetApproaching,
                    AnomalySeverity::Low,
                    format!(
                        "{} is at {:.0}% of its ${:.2} budget",
                        budget.category,
                        ratio * 100.0,
                        budget.amount
                    ),
                )
            } else {
                continue;
            };

            anomalies.push(Anomaly {
                date: view.today,
                category: budget.category.clone(),
                actual: spent,
                expected: budget.amount,
                severity,
                kind,
                description,
            });
        }

        anomalies
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AnalysisContext;
    use crate::ledger::LedgerView;
    use crate::models::BudgetPeriod;
    use chrono::{Days, NaiveDate};

    fn expense(id: u32, date: NaiveDate, amount: f64) -> Transaction {
        Transaction {
            id: format!("t{:03}", id),
            date,
            amount,
            kind: TxKind::Expense,
            category: Some("Shopping".to_string()),
            description: "store".to_string(),
        }
    }

    fn daily_expenses(amounts: &[f64], last: &str) -> Vec<Transaction> {
        let last: NaiveDate = last.parse().unwrap();
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| {
                expense(
                    i as u32,
                    last - Days::new((amounts.len() - 1 - i) as u64),
                    amount,
                )
            })
            .collect()
    }

    #[test]
    fn test_spike_flagged_medium_then_high() {
        let config = AnalyticsConfig::default();
        let detector = AnomalyDetector::new(&config);

        // Steady $10 spend, then a 4x spike and a 10x spike
        let txs = daily_expenses(&[10.0, 10.0, 10.0, 10.0, 40.0, 10.0, 100.0], "2025-06-07");
        let anomalies = detector.transaction_anomalies(&txs);

        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Medium);
        assert!((anomalies[0].actual - 40.0).abs() < 1e-9);
        assert_eq!(anomalies[1].severity, AnomalySeverity::High);
        assert!((anomalies[1].actual - 100.0).abs() < 1e-9);
        assert!(anomalies
            .iter()
            .all(|a| a.kind == AnomalyKind::Transaction));
    }

    #[test]
    fn test_no_baseline_no_flags() {
        let config = AnalyticsConfig::default();
        let detector = AnomalyDetector::new(&config);

        // First transaction has no preceding window, however large
        let txs = daily_expenses(&[5000.0], "2025-06-07");
        assert!(detector.transaction_anomalies(&txs).is_empty());
    }

    #[test]
    fn test_window_is_bounded() {
        let config = AnalyticsConfig::default();
        let detector = AnomalyDetector::new(&config);

        // Old large values must age out of the 7-entry window: after seven
        // $10 days the early $500 no longer props up the mean
        let mut amounts = vec![500.0];
        amounts.extend(std::iter::repeat(10.0).take(7));
        amounts.push(35.0); // 3.5x the $10 mean
        let txs = daily_expenses(&amounts, "2025-06-09");

        let anomalies = detector.transaction_anomalies(&txs);
        assert_eq!(anomalies.len(), 1);
        assert!((anomalies[0].actual - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_income_and_expense_windows_are_separate() {
        let config = AnalyticsConfig::default();
        let detector = AnomalyDetector::new(&config);

        let mut txs = daily_expenses(&[10.0, 10.0, 10.0], "2025-06-03");
        txs.push(Transaction {
            id: "pay".to_string(),
            date: "2025-06-04".parse().unwrap(),
            amount: 3000.0,
            kind: TxKind::Income,
            category: None,
            description: "salary".to_string(),
        });
        txs.sort_by(|a, b| a.date.cmp(&b.date));

        // A large income with no income baseline is not an anomaly, and it
        // must not contaminate the expense window either
        assert!(detector.transaction_anomalies(&txs).is_empty());
    }

    #[test]
    fn test_budget_bands() {
        let config = AnalyticsConfig::default();
        let detector = AnomalyDetector::new(&config);

        let today: NaiveDate = "2025-06-15".parse().unwrap();
        let txs = vec![
            Transaction {
                id: "a".to_string(),
                date: "2025-06-05".parse().unwrap(),
                amount: 95.0,
                kind: TxKind::Expense,
                category: Some("Dining".to_string()),
                description: "restaurant".to_string(),
            },
            Transaction {
                id: "b".to_string(),
                date: "2025-06-06".parse().unwrap(),
                amount: 300.0,
                kind: TxKind::Expense,
                category: Some("Shopping".to_string()),
                description: "mall".to_string(),
            },
        ];
        let ctx = AnalysisContext::new(txs, vec![], vec![], vec![], today);
        let view = LedgerView::build(&ctx, &config);

        let budgets = vec![
            Budget {
                category: "Dining".to_string(),
                amount: 100.0,
                period: BudgetPeriod::Monthly,
            },
            Budget {
                category: "Shopping".to_string(),
                amount: 200.0,
                period: BudgetPeriod::Monthly,
            },
            Budget {
                category: "Travel".to_string(),
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
        ];

        let anomalies = detector.budget_anomalies(&view, &budgets);
        assert_eq!(anomalies.len(), 2);

        let dining = anomalies.iter().find(|a| a.category == "Dining").unwrap();
        assert_eq!(dining.kind, AnomalyKind::BudgetApproaching);
        assert_eq!(dining.severity, AnomalySeverity::Low);

        let shopping = anomalies.iter().find(|a| a.category == "Shopping").unwrap();
        assert_eq!(shopping.kind, AnomalyKind::BudgetExceeded);
        assert_eq!(shopping.severity, AnomalySeverity::High);
    }
}
