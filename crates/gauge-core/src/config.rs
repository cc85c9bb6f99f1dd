//! Analytics configuration
//!
//! Every heuristic threshold in the engine lives here as a named,
//! documented value. The defaults are tunings, not derived-from-data
//! constants; changing one changes behavior without code changes.
//!
//! ## Configuration Resolution
//!
//! Callers either use [`AnalyticsConfig::default`] or load a TOML override
//! file. An override file only needs the keys it changes; everything else
//! falls back to the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive day-gap band for one periodicity class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapBand {
    pub min: f64,
    pub max: f64,
}

impl GapBand {
    pub fn contains(&self, gap: f64) -> bool {
        gap >= self.min && gap <= self.max
    }
}

/// Weights of the five health score factors. Must sum to ~1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub consistency: f64,
    pub budget: f64,
    pub savings: f64,
    pub activity: f64,
    pub diversification: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            consistency: 0.20,
            budget: 0.25,
            savings: 0.25,
            activity: 0.15,
            diversification: 0.15,
        }
    }
}

impl HealthWeights {
    pub fn sum(&self) -> f64 {
        self.consistency + self.budget + self.savings + self.activity + self.diversification
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    // History window
    /// Transaction window cap in months before "today". Older records are
    /// ignored by the normalizer and everything downstream.
    pub history_cap_months: u32,

    // Recurrence detection
    /// Day-gap band classified as weekly
    pub weekly_gap: GapBand,
    /// Day-gap band classified as biweekly
    pub biweekly_gap: GapBand,
    /// Day-gap band classified as monthly
    pub monthly_gap: GapBand,
    /// Day-gap band classified as quarterly
    pub quarterly_gap: GapBand,
    /// Day-gap band classified as yearly
    pub yearly_gap: GapBand,
    /// Minimum same-merchant transactions to consider a pattern
    pub min_occurrences: usize,
    /// Patterns below this interval-regularity confidence are discarded
    pub confidence_cutoff: f64,
    /// Monthly patterns above this confidence are flagged as subscriptions
    pub subscription_confidence: f64,

    // Anomaly detection
    /// Rolling window: number of preceding same-kind transactions in the
    /// baseline mean
    pub anomaly_window: usize,
    /// Magnitude over baseline-mean multiple that flags an anomaly
    pub anomaly_multiplier: f64,
    /// Multiple past which an anomaly is high severity instead of medium
    pub anomaly_high_multiplier: f64,
    /// Month-to-date spend over this fraction of a budget flags the category
    pub budget_warning_ratio: f64,

    // Velocity projection
    /// Projected-vs-budget ratio above which the burn rate is "fast"
    pub burn_fast_ratio: f64,
    /// Projected-vs-budget ratio below which the burn rate is "slow"
    pub burn_slow_ratio: f64,

    // Insight rules
    /// Top-category share of monthly spend that flags concentration
    pub top_category_share: f64,
    /// Weekend share of trailing-30-day spend that flags weekend spending
    pub weekend_share: f64,
    /// Savings rate (percent) below which the low-savings rule fires
    pub savings_rate_floor: f64,
    /// Transactions under this amount count as "small"
    pub small_tx_ceiling: f64,
    /// Small-transaction share of monthly spend that flags the aggregate
    pub small_tx_share: f64,
    /// Days without matching ledger activity before an active subscription
    /// counts as idle
    pub idle_subscription_grace_days: i64,

    // Health score
    pub health_weights: HealthWeights,
    /// Score returned for an empty ledger instead of a computed value
    pub neutral_score: f64,

    // Memo cache
    /// Seconds a memoized report stays valid
    pub memo_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            history_cap_months: 24,
            weekly_gap: GapBand { min: 5.0, max: 9.0 },
            biweekly_gap: GapBand {
                min: 12.0,
                max: 17.0,
            },
            monthly_gap: GapBand {
                min: 25.0,
                max: 35.0,
            },
            quarterly_gap: GapBand {
                min: 85.0,
                max: 100.0,
            },
            yearly_gap: GapBand {
                min: 350.0,
                max: 380.0,
            },
            min_occurrences: 2,
            confidence_cutoff: 50.0,
            subscription_confidence: 80.0,
            anomaly_window: 7,
            anomaly_multiplier: 3.0,
            anomaly_high_multiplier: 5.0,
            budget_warning_ratio: 0.90,
            burn_fast_ratio: 1.10,
            burn_slow_ratio: 0.85,
            top_category_share: 0.40,
            weekend_share: 0.45,
            savings_rate_floor: 10.0,
            small_tx_ceiling: 15.0,
            small_tx_share: 0.15,
            idle_subscription_grace_days: 45,
            health_weights: HealthWeights::default(),
            neutral_score: 50.0,
            memo_ttl_secs: 30,
        }
    }
}

impl AnalyticsConfig {
    /// Parse a TOML override. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML override file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject configurations the engine cannot interpret
    pub fn validate(&self) -> Result<()> {
        let w = &self.health_weights;
        for (name, value) in [
            ("consistency", w.consistency),
            ("budget", w.budget),
            ("savings", w.savings),
            ("activity", w.activity),
            ("diversification", w.diversification),
        ] {
            if value <= 0.0 {
                return Err(Error::Config(format!(
                    "health weight '{}' must be positive, got {}",
                    name, value
                )));
            }
        }
        if (w.sum() - 1.0).abs() > 0.01 {
            return Err(Error::Config(format!(
                "health weights must sum to 1.0, got {:.3}",
                w.sum()
            )));
        }

        for (name, band) in [
            ("weekly_gap", self.weekly_gap),
            ("biweekly_gap", self.biweekly_gap),
            ("monthly_gap", self.monthly_gap),
            ("quarterly_gap", self.quarterly_gap),
            ("yearly_gap", self.yearly_gap),
        ] {
            if band.min <= 0.0 || band.max < band.min {
                return Err(Error::Config(format!(
                    "{} must satisfy 0 < min <= max, got {}..{}",
                    name, band.min, band.max
                )));
            }
        }

        if self.min_occurrences < 2 {
            return Err(Error::Config(
                "min_occurrences must be at least 2; one charge is not a pattern".into(),
            ));
        }
        if self.anomaly_window == 0 {
            return Err(Error::Config(
                "anomaly_window must be at least 1".into(),
            ));
        }
        if self.anomaly_high_multiplier < self.anomaly_multiplier {
            return Err(Error::Config(
                "anomaly_high_multiplier must be >= anomaly_multiplier".into(),
            ));
        }
        if self.burn_slow_ratio >= self.burn_fast_ratio {
            return Err(Error::Config(
                "burn_slow_ratio must be below burn_fast_ratio".into(),
            ));
        }

        Ok(())
    }
}
