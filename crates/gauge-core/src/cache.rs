//! Short-TTL memo cache
//!
//! Purely a performance memo: a hit and a miss must produce identical
//! results, so the cache stores the full report keyed by a SHA-256
//! fingerprint of the serialized inputs and config. The TTL clock
//! (`Instant`) only decides expiry; it never feeds computation.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::context::AnalysisContext;
use crate::engine::AnalysisReport;

struct MemoEntry {
    fingerprint: String,
    report: AnalysisReport,
    stored_at: Instant,
}

pub struct MemoCache {
    ttl: Duration,
    entry: Mutex<Option<MemoEntry>>,
}

impl MemoCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Return the memoized report if the fingerprint matches and the entry
    /// is still fresh
    pub fn get(&self, fingerprint: &str) -> Option<AnalysisReport> {
        let guard = self.entry.lock().expect("memo lock poisoned");
        guard
            .as_ref()
            .filter(|e| e.fingerprint == fingerprint && e.stored_at.elapsed() < self.ttl)
            .map(|e| e.report.clone())
    }

    pub fn put(&self, fingerprint: String, report: AnalysisReport) {
        let mut guard = self.entry.lock().expect("memo lock poisoned");
        *guard = Some(MemoEntry {
            fingerprint,
            report,
            stored_at: Instant::now(),
        });
    }

    /// Explicit invalidation hook for the caller's change-notification layer
    pub fn invalidate(&self) {
        let mut guard = self.entry.lock().expect("memo lock poisoned");
        if guard.take().is_some() {
            debug!("memo cache invalidated");
        }
    }
}

/// Fingerprint of everything that can influence a report
pub fn fingerprint(ctx: &AnalysisContext, config: &AnalyticsConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        serde_json::to_vec(ctx).expect("analysis context serialization is infallible"),
    );
    hasher.update(serde_json::to_vec(config).expect("config serialization is infallible"));
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx(today: &str) -> AnalysisContext {
        AnalysisContext::empty(today.parse::<NaiveDate>().unwrap())
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let config = AnalyticsConfig::default();
        let a = fingerprint(&ctx("2025-06-15"), &config);
        let b = fingerprint(&ctx("2025-06-15"), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_tracks_inputs() {
        let config = AnalyticsConfig::default();
        assert_ne!(
            fingerprint(&ctx("2025-06-15"), &config),
            fingerprint(&ctx("2025-06-16"), &config)
        );

        let mut tweaked = AnalyticsConfig::default();
        tweaked.confidence_cutoff = 60.0;
        assert_ne!(
            fingerprint(&ctx("2025-06-15"), &config),
            fingerprint(&ctx("2025-06-15"), &tweaked)
        );
    }

    #[test]
    fn test_invalidate_clears_entry() {
        let engine = crate::engine::AnalyticsEngine::new();
        let report = engine.analyze(&ctx("2025-06-15"));

        engine.invalidate();
        // Recompute after invalidation must still be identical: the cache
        // is for speed, never for correctness
        let recomputed = engine.analyze(&ctx("2025-06-15"));
        assert_eq!(report, recomputed);
    }
}
