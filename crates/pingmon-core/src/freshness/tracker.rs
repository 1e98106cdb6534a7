//! Freshness tracker
//!
//! Each threshold answers "how long since a sample was at least this slow".
//! A measurement of 0 is the reset sentinel and stamps every threshold,
//! including 0 itself. Upstream, a failed probe is also reported as 0, so a
//! failure refreshes every bucket. That overlap is kept as-is.

use super::report::FreshnessReport;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Threshold keys in milliseconds
pub const THRESHOLDS_MS: [u64; 11] = [0, 25, 50, 75, 100, 200, 500, 1000, 1500, 2000, 3000];

/// Measurement value that stamps every threshold
pub const RESET_SENTINEL_MS: u64 = 0;

/// Threshold → last time a measurement satisfied it
#[derive(Debug, Clone)]
pub struct FreshnessTracker {
    last_seen: BTreeMap<u64, DateTime<Utc>>,
}

impl FreshnessTracker {
    /// Create a tracker with every threshold stamped now
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a tracker with every threshold stamped at `start`
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            last_seen: THRESHOLDS_MS.iter().map(|&k| (k, start)).collect(),
        }
    }

    /// Fold in a measurement taken now
    pub fn update(&mut self, measurement_ms: u64) -> usize {
        self.update_at(measurement_ms, Utc::now())
    }

    /// Fold in a measurement taken at `now`
    ///
    /// # Returns
    /// Number of thresholds stamped
    pub fn update_at(&mut self, measurement_ms: u64, now: DateTime<Utc>) -> usize {
        let mut stamped = 0;
        for (&key, seen) in self.last_seen.iter_mut() {
            let hit = if measurement_ms == RESET_SENTINEL_MS {
                true
            } else {
                key > 0 && measurement_ms >= key
            };
            if hit {
                // Never move a stamp backwards
                *seen = (*seen).max(now);
                stamped += 1;
            }
        }
        stamped
    }

    /// Last time the given threshold was satisfied
    pub fn last_satisfied(&self, threshold_ms: u64) -> Option<DateTime<Utc>> {
        self.last_seen.get(&threshold_ms).copied()
    }

    /// `(threshold, last satisfied)` pairs in ascending threshold order
    pub fn iter(&self) -> impl Iterator<Item = (u64, DateTime<Utc>)> + '_ {
        self.last_seen.iter().map(|(&k, &t)| (k, t))
    }

    /// Build the elapsed-time report as of `now`
    pub fn report(&self, now: DateTime<Utc>, short_view: bool) -> FreshnessReport {
        FreshnessReport::build(self.iter(), now, short_view)
    }
}

impl Default for FreshnessTracker {
    fn default() -> Self {
        Self::new()
    }
}
