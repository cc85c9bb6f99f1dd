//! Recurring charge detection
//!
//! Groups expenses by normalized merchant key, measures the day-gaps
//! between consecutive charges, classifies the cadence against fixed
//! bands, and predicts the next occurrence. Interval regularity becomes a
//! 0-100 confidence via an inverse coefficient of variation: perfectly
//! regular gaps score near 100, noisy gaps near 0.
//!
//! Patterns are derived fresh from history on every run and merged with
//! the user's explicit subscription list so the same bill is never
//! reported twice.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::ledger::{merchant_key, LedgerView};
use crate::models::{
    BillSource, Frequency, RecurringPattern, Subscription, Transaction, TxKind, UpcomingBill,
};

/// Merchant keywords that mark a detected pattern as a subscription
/// service regardless of cadence confidence. Matched against whole tokens
/// of the normalized merchant key.
const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "netflix",
    "spotify",
    "hulu",
    "disney",
    "hbo",
    "paramount",
    "peacock",
    "youtube",
    "audible",
    "icloud",
    "dropbox",
    "onedrive",
    "adobe",
    "patreon",
    "substack",
    "medium",
    "nyt",
    "wsj",
    "peloton",
    "strava",
    "headspace",
    "calm",
    "gym",
];

pub struct RecurrenceDetector<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> RecurrenceDetector<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Detect recurring charges in the normalized ledger.
    /// Output is sorted ascending by predicted next date: soonest bill first.
    pub fn detect(&self, view: &LedgerView) -> Vec<RecurringPattern> {
        let mut by_merchant: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for tx in view.transactions.iter().filter(|t| t.kind == TxKind::Expense) {
            let key = merchant_key(&tx.description);
            if key.is_empty() {
                continue;
            }
            by_merchant.entry(key).or_default().push(tx);
        }

        let mut patterns: Vec<RecurringPattern> = Vec::new();

        for (key, txs) in &by_merchant {
            if txs.len() < self.config.min_occurrences {
                continue;
            }

            // view.transactions is date-sorted, so the group already is
            let gaps: Vec<f64> = txs
                .windows(2)
                .map(|w| (w[1].date - w[0].date).num_days())
                .filter(|&d| d > 0)
                .map(|d| d as f64)
                .collect();

            if gaps.is_empty() {
                continue;
            }

            let mean_gap = mean(&gaps);
            let Some(frequency) = self.classify_gap(mean_gap) else {
                debug!(merchant = %key, mean_gap, "gap outside all cadence bands");
                continue;
            };

            let confidence = gap_confidence(&gaps, mean_gap);
            if confidence < self.config.confidence_cutoff {
                debug!(merchant = %key, confidence, "pattern below confidence cutoff");
                continue;
            }

            let amounts: Vec<f64> = txs.iter().map(|t| t.amount).collect();
            let last_date = txs.last().expect("group is non-empty").date;

            let is_subscription = key
                .split_whitespace()
                .any(|token| SUBSCRIPTION_KEYWORDS.contains(&token))
                || (frequency == Frequency::Monthly
                    && confidence > self.config.subscription_confidence);

            patterns.push(RecurringPattern {
                merchant_key: key.clone(),
                display_name: display_name(txs),
                frequency,
                average_amount: mean(&amounts),
                last_date,
                next_date: frequency.advance(last_date),
                confidence: confidence.round() as u8,
                occurrences: txs.len(),
                is_subscription,
            });
        }

        patterns.sort_by(|a, b| {
            a.next_date
                .cmp(&b.next_date)
                .then_with(|| a.merchant_key.cmp(&b.merchant_key))
        });

        info!(
            merchants = by_merchant.len(),
            patterns = patterns.len(),
            "recurrence detection complete"
        );

        patterns
    }

    /// Merge explicit subscriptions with detected patterns into one bill
    /// list. Identity is merchant-key equality; the explicit subscription
    /// wins when both exist.
    pub fn upcoming_bills(
        &self,
        subscriptions: &[Subscription],
        patterns: &[RecurringPattern],
        view: &LedgerView,
    ) -> Vec<UpcomingBill> {
        let mut bills: Vec<UpcomingBill> = Vec::new();
        let mut explicit_keys: Vec<String> = Vec::new();

        for sub in subscriptions.iter().filter(|s| s.is_active) {
            explicit_keys.push(merchant_key(&sub.name));

            // Roll a stale or missing payment date forward to the first
            // cycle boundary at or after today
            let mut due = sub
                .next_payment_date
                .unwrap_or_else(|| sub.cycle.advance(view.today));
            while due < view.today {
                due = sub.cycle.advance(due);
            }

            bills.push(UpcomingBill {
                name: sub.name.clone(),
                amount: sub.price,
                due_date: due,
                source: BillSource::Subscription,
                confidence: 100,
            });
        }

        for pattern in patterns {
            if explicit_keys.iter().any(|k| *k == pattern.merchant_key) {
                continue;
            }
            bills.push(UpcomingBill {
                name: pattern.display_name.clone(),
                amount: pattern.average_amount,
                due_date: pattern.next_date,
                source: BillSource::Prediction,
                confidence: pattern.confidence,
            });
        }

        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        bills
    }

    fn classify_gap(&self, mean_gap: f64) -> Option<Frequency> {
        let c = self.config;
        if c.weekly_gap.contains(mean_gap) {
            Some(Frequency::Weekly)
        } else if c.biweekly_gap.contains(mean_gap) {
            Some(Frequency::Biweekly)
        } else if c.monthly_gap.contains(mean_gap) {
            Some(Frequency::Monthly)
        } else if c.quarterly_gap.contains(mean_gap) {
            Some(Frequency::Quarterly)
        } else if c.yearly_gap.contains(mean_gap) {
            Some(Frequency::Yearly)
        } else {
            None
        }
    }
}

/// Inverse coefficient of variation mapped onto 0-100
fn gap_confidence(gaps: &[f64], mean_gap: f64) -> f64 {
    if mean_gap <= 0.0 {
        return 0.0;
    }
    let cv = stddev(gaps, mean_gap) / mean_gap;
    (100.0 - cv * 100.0).max(0.0)
}

/// Most common raw description in the group, ties broken lexicographically
fn display_name(txs: &[&Transaction]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tx in txs {
        *counts.entry(tx.description.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(desc, _)| desc.to_string())
        .unwrap_or_default()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AnalysisContext;
    use crate::models::BillingCycle;
    use chrono::{Days, NaiveDate};

    fn expense(id: u32, date: NaiveDate, amount: f64, description: &str) -> Transaction {
        Transaction {
            id: format!("t{}", id),
            date,
            amount,
            kind: TxKind::Expense,
            category: Some("Entertainment".to_string()),
            description: description.to_string(),
        }
    }

    fn view_of(transactions: Vec<Transaction>, today: &str) -> LedgerView {
        let ctx = AnalysisContext::new(
            transactions,
            vec![],
            vec![],
            vec![],
            today.parse().unwrap(),
        );
        LedgerView::build(&ctx, &AnalyticsConfig::default())
    }

    /// n charges spaced exactly `gap` days apart, ending near `today`
    fn regular_series(description: &str, gap: u64, n: u32, last: &str) -> Vec<Transaction> {
        let last: NaiveDate = last.parse().unwrap();
        (0..n)
            .map(|i| {
                let date = last - Days::new(gap * (n - 1 - i) as u64);
                expense(i, date, 9.99, description)
            })
            .collect()
    }

    #[test]
    fn test_gap_band_classification() {
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);

        assert_eq!(detector.classify_gap(6.0), Some(Frequency::Weekly));
        assert_eq!(detector.classify_gap(14.0), Some(Frequency::Biweekly));
        assert_eq!(detector.classify_gap(30.0), Some(Frequency::Monthly));
        assert_eq!(detector.classify_gap(90.0), Some(Frequency::Quarterly));
        assert_eq!(detector.classify_gap(365.0), Some(Frequency::Yearly));
        // Between bands: no pattern, not an error
        assert_eq!(detector.classify_gap(45.0), None);
        assert_eq!(detector.classify_gap(3.0), None);
    }

    #[test]
    fn test_gap_outside_bands_excluded() {
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);
        let view = view_of(regular_series("ODD MERCHANT", 45, 5, "2025-06-01"), "2025-06-10");

        assert!(detector.detect(&view).is_empty());
    }

    #[test]
    fn test_perfectly_regular_is_high_confidence() {
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);
        let view = view_of(regular_series("CLOCKWORK LLC", 30, 6, "2025-06-01"), "2025-06-10");

        let patterns = detector.detect(&view);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].frequency, Frequency::Monthly);
        assert!(patterns[0].confidence >= 95);
        assert_eq!(patterns[0].occurrences, 6);
    }

    #[test]
    fn test_jitter_lowers_confidence() {
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);

        let regular = view_of(regular_series("CLOCKWORK LLC", 30, 6, "2025-06-01"), "2025-06-10");
        let regular_conf = detector.detect(&regular)[0].confidence;

        // Same cadence with +/-10 day jitter: gaps 20, 40, 20, 40, 30
        let last: NaiveDate = "2025-06-01".parse().unwrap();
        let offsets = [150u64, 130, 90, 70, 30, 0];
        let jittered: Vec<Transaction> = offsets
            .iter()
            .enumerate()
            .map(|(i, off)| expense(i as u32, last - Days::new(*off), 9.99, "JITTERY LLC"))
            .collect();
        let jittered_view = view_of(jittered, "2025-06-10");
        let patterns = detector.detect(&jittered_view);
        assert_eq!(patterns.len(), 1);

        assert!(patterns[0].confidence < regular_conf);
    }

    #[test]
    fn test_single_occurrence_ignored() {
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);
        let view = view_of(
            vec![expense(1, "2025-05-01".parse().unwrap(), 50.0, "ONE OFF STORE")],
            "2025-06-10",
        );

        assert!(detector.detect(&view).is_empty());
    }

    #[test]
    fn test_duplicate_dates_do_not_poison_gaps() {
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);

        let mut txs = regular_series("CLOCKWORK LLC", 30, 4, "2025-06-01");
        // Same-day duplicate charge: the zero gap must be dropped
        txs.push(expense(99, "2025-06-01".parse().unwrap(), 9.99, "CLOCKWORK LLC"));
        let view = view_of(txs, "2025-06-10");

        let patterns = detector.detect(&view);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].frequency, Frequency::Monthly);
    }

    #[test]
    fn test_netflix_monthly_scenario() {
        // The 1st of four consecutive months at a fixed price
        let dates = ["2025-01-01", "2025-02-01", "2025-03-01", "2025-04-01"];
        let txs: Vec<Transaction> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| expense(i as u32, d.parse().unwrap(), 15.99, "Netflix"))
            .collect();
        let view = view_of(txs, "2025-04-15");

        let config = AnalyticsConfig::default();
        let patterns = RecurrenceDetector::new(&config).detect(&view);

        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.frequency, Frequency::Monthly);
        assert!(p.confidence >= 90);
        assert_eq!(p.next_date, "2025-05-01".parse::<NaiveDate>().unwrap());
        assert!(p.is_subscription);
        assert!((p.average_amount - 15.99).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_subscription_takes_precedence() {
        let view = view_of(regular_series("NETFLIX.COM", 30, 4, "2025-06-01"), "2025-06-10");
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);
        let patterns = detector.detect(&view);
        assert_eq!(patterns.len(), 1);

        let subs = vec![Subscription {
            name: "NETFLIX COM".to_string(),
            price: 15.99,
            cycle: BillingCycle::Monthly,
            is_trial: false,
            is_active: true,
            next_payment_date: Some("2025-07-01".parse().unwrap()),
        }];

        let bills = detector.upcoming_bills(&subs, &patterns, &view);
        // One bill, not two: the explicit subscription wins
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].source, BillSource::Subscription);
        assert_eq!(bills[0].confidence, 100);
        assert_eq!(bills[0].due_date, "2025-07-01".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_stale_payment_date_rolled_forward() {
        let view = view_of(vec![], "2025-06-10");
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);

        let subs = vec![Subscription {
            name: "Gym".to_string(),
            price: 40.0,
            cycle: BillingCycle::Monthly,
            is_trial: false,
            is_active: true,
            next_payment_date: Some("2025-03-05".parse().unwrap()),
        }];

        let bills = detector.upcoming_bills(&subs, &[], &view);
        assert_eq!(bills.len(), 1);
        // First cycle boundary on or after today, anchored at March 5
        assert_eq!(bills[0].due_date, "2025-07-05".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_inactive_subscriptions_skipped() {
        let view = view_of(vec![], "2025-06-10");
        let config = AnalyticsConfig::default();
        let detector = RecurrenceDetector::new(&config);

        let subs = vec![Subscription {
            name: "Old Paper".to_string(),
            price: 10.0,
            cycle: BillingCycle::Monthly,
            is_trial: false,
            is_active: false,
            next_payment_date: None,
        }];

        assert!(detector.upcoming_bills(&subs, &[], &view).is_empty());
    }
}
