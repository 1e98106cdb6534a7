//! A single processed probe result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One RTT measurement, or a failure, recorded exactly once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// 1-based position in the history
    pub index: u64,
    /// When the probe completed
    pub timestamp: DateTime<Utc>,
    /// Measured round-trip time (None = failed/timed-out probe)
    pub rtt: Option<Duration>,
}

impl Sample {
    /// Whether the probe behind this sample failed
    pub fn is_failure(&self) -> bool {
        self.rtt.is_none()
    }

    /// Round-trip time in fractional milliseconds
    pub fn rtt_ms(&self) -> Option<f64> {
        self.rtt.map(|d| d.as_nanos() as f64 / 1_000_000.0)
    }

    /// Whole-millisecond value fed to the freshness tracker.
    ///
    /// Failures map to 0, the reset sentinel.
    pub fn freshness_measurement(&self) -> u64 {
        self.rtt.map_or(0, whole_millis)
    }
}

/// Measured RTT in whole milliseconds, never below 1
///
/// 0 ms is reserved for failures, so sub-millisecond replies round up.
pub fn whole_millis(rtt: Duration) -> u64 {
    u64::try_from(rtt.as_millis()).unwrap_or(u64::MAX).max(1)
}
