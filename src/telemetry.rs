//! Telemetry Module
//!
//! Counts verdicts by outcome for the stats endpoint and the shutdown summary.
//! Only counters are kept; referrers and click ids are never stored here.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::types::{FlagReason, Verdict};

#[derive(Debug, Default)]
pub struct VerdictTelemetry {
    total: AtomicU64,
    legitimate: AtomicU64,
    flagged_target_referrer: AtomicU64,
    flagged_missing_key: AtomicU64,
}

impl VerdictTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, verdict: &Verdict) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let counter = match verdict.flag_reason() {
            Some(FlagReason::TargetReferrer) => &self.flagged_target_referrer,
            Some(FlagReason::MissingKey) => &self.flagged_missing_key,
            None => &self.legitimate,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> VerdictStats {
        let target_referrer = self.flagged_target_referrer.load(Ordering::Relaxed);
        let missing_key = self.flagged_missing_key.load(Ordering::Relaxed);
        VerdictStats {
            total_classified: self.total.load(Ordering::Relaxed),
            legitimate: self.legitimate.load(Ordering::Relaxed),
            flagged: target_referrer + missing_key,
            flagged_target_referrer: target_referrer,
            flagged_missing_key: missing_key,
        }
    }
}

/// Snapshot of the verdict counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerdictStats {
    pub total_classified: u64,
    pub legitimate: u64,
    pub flagged: u64,
    pub flagged_target_referrer: u64,
    pub flagged_missing_key: u64,
}

impl VerdictStats {
    /// Share of flagged traffic, 0-100
    pub fn flagged_percent(&self) -> f64 {
        if self.total_classified == 0 {
            return 0.0;
        }
        self.flagged as f64 / self.total_classified as f64 * 100.0
    }
}
