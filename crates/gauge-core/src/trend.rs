//! Month-over-month category trends
//!
//! Fits an ordinary least-squares line to each category's monthly totals
//! and classifies the direction from the slope as a percentage of the
//! series mean. Raw slope is not comparable across categories of
//! different scale; the percent normalization is.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::ledger::LedgerView;

/// Slope-percent beyond which a trend counts as moving
const TREND_SLOPE_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

/// Trend of one category's monthly spend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub category: String,
    pub direction: TrendDirection,
    /// OLS slope as a percentage of the series mean per month
    pub slope_pct: f64,
    /// Number of monthly observations behind the fit
    pub months: usize,
}

/// Estimate trends for every category in the view. Categories with fewer
/// than 2 months of history come back stable with zero magnitude, never
/// fabricated. Steepest risers first.
pub fn estimate_trends(view: &LedgerView) -> Vec<CategoryTrend> {
    let month_keys: Vec<_> = view.months.keys().copied().collect();

    let categories: BTreeSet<&str> = view
        .months
        .values()
        .flat_map(|b| b.by_category.keys().map(String::as_str))
        .collect();

    let mut trends: Vec<CategoryTrend> = categories
        .into_iter()
        .map(|category| {
            // Series runs from the category's first active month through the
            // latest bucket; quiet months in between contribute zero.
            let first = month_keys
                .iter()
                .position(|k| {
                    view.months[k].by_category.contains_key(category)
                })
                .unwrap_or(0);

            let series: Vec<f64> = month_keys[first..]
                .iter()
                .map(|k| {
                    view.months[k]
                        .by_category
                        .get(category)
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();

            let (direction, slope_pct) = classify(&series);
            CategoryTrend {
                category: category.to_string(),
                direction,
                slope_pct,
                months: series.len(),
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        b.slope_pct
            .partial_cmp(&a.slope_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    trends
}

fn classify(series: &[f64]) -> (TrendDirection, f64) {
    if series.len() < 2 {
        return (TrendDirection::Stable, 0.0);
    }

    let mean = series.iter().sum::<f64>() / series.len() as f64;
    if mean == 0.0 {
        return (TrendDirection::Stable, 0.0);
    }

    let slope = ols_slope(series);
    let slope_pct = slope / mean * 100.0;

    let direction = if slope_pct > TREND_SLOPE_PCT {
        TrendDirection::Up
    } else if slope_pct < -TREND_SLOPE_PCT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    (direction, slope_pct)
}

/// OLS slope over (0..n-1, y)
fn ols_slope(series: &[f64]) -> f64 {
    let n = series.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = series.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::context::AnalysisContext;
    use crate::ledger::LedgerView;
    use crate::models::{Transaction, TxKind};
    use chrono::NaiveDate;

    fn expense(id: u32, date: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: date.parse().unwrap(),
            amount,
            kind: TxKind::Expense,
            category: Some(category.to_string()),
            description: "x".to_string(),
        }
    }

    fn view_of(transactions: Vec<Transaction>, today: &str) -> LedgerView {
        let today: NaiveDate = today.parse().unwrap();
        let ctx = AnalysisContext::new(transactions, vec![], vec![], vec![], today);
        LedgerView::build(&ctx, &AnalyticsConfig::default())
    }

    #[test]
    fn test_ols_slope_exact_line() {
        assert!((ols_slope(&[10.0, 20.0, 30.0, 40.0]) - 10.0).abs() < 1e-9);
        assert!((ols_slope(&[40.0, 30.0, 20.0, 10.0]) + 10.0).abs() < 1e-9);
        assert_eq!(ols_slope(&[5.0]), 0.0);
    }

    #[test]
    fn test_rising_category_classified_up() {
        let view = view_of(
            vec![
                expense(1, "2025-03-10", 100.0, "Dining"),
                expense(2, "2025-04-10", 150.0, "Dining"),
                expense(3, "2025-05-10", 210.0, "Dining"),
            ],
            "2025-05-20",
        );

        let trends = estimate_trends(&view);
        let dining = trends.iter().find(|t| t.category == "Dining").unwrap();
        assert_eq!(dining.direction, TrendDirection::Up);
        assert!(dining.slope_pct > TREND_SLOPE_PCT);
        assert_eq!(dining.months, 3);
    }

    #[test]
    fn test_flat_category_classified_stable() {
        let view = view_of(
            vec![
                expense(1, "2025-03-10", 100.0, "Rent"),
                expense(2, "2025-04-10", 101.0, "Rent"),
                expense(3, "2025-05-10", 100.0, "Rent"),
            ],
            "2025-05-20",
        );

        let trends = estimate_trends(&view);
        let rent = trends.iter().find(|t| t.category == "Rent").unwrap();
        assert_eq!(rent.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_single_month_never_fabricated() {
        let view = view_of(vec![expense(1, "2025-05-10", 300.0, "Travel")], "2025-05-20");

        let trends = estimate_trends(&view);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Stable);
        assert_eq!(trends[0].slope_pct, 0.0);
    }

    #[test]
    fn test_quiet_months_count_as_zero() {
        // Spend in March and May only; April is an implicit zero, which
        // keeps the fit honest about the gap.
        let view = view_of(
            vec![
                expense(1, "2025-03-10", 100.0, "Hobby"),
                expense(2, "2025-04-10", 50.0, "Other"),
                expense(3, "2025-05-10", 100.0, "Hobby"),
            ],
            "2025-05-20",
        );

        let trends = estimate_trends(&view);
        let hobby = trends.iter().find(|t| t.category == "Hobby").unwrap();
        assert_eq!(hobby.months, 3);
        assert_eq!(hobby.direction, TrendDirection::Stable);
    }
}
