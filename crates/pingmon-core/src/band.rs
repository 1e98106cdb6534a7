//! Severity band for a single round-trip time
//!
//! Used to colour the live "last RTT" label. Kept as a lookup table so the
//! mapping is testable without any rendering.

use crate::series::sample::whole_millis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latency severity for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RttBand {
    /// Probe failed (reported as 0 ms)
    Failed,
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

/// Inclusive upper bounds in milliseconds, checked in order
const RTT_BANDS: [(u64, RttBand); 4] = [
    (100, RttBand::Excellent),
    (250, RttBand::Good),
    (500, RttBand::Fair),
    (1500, RttBand::Poor),
];

impl RttBand {
    /// Classify a round-trip time in whole milliseconds (0 = failed)
    pub fn classify(rtt_ms: u64) -> Self {
        if rtt_ms == 0 {
            return RttBand::Failed;
        }
        RTT_BANDS
            .iter()
            .find(|(upper, _)| rtt_ms <= *upper)
            .map_or(RttBand::Critical, |&(_, band)| band)
    }

    /// Classify an optional RTT, `None` being a failed probe
    pub fn from_rtt(rtt: Option<Duration>) -> Self {
        match rtt {
            Some(rtt) if rtt.is_zero() => RttBand::Failed,
            Some(rtt) => Self::classify(whole_millis(rtt)),
            None => RttBand::Failed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RttBand::Failed => "failed",
            RttBand::Excellent => "excellent",
            RttBand::Good => "good",
            RttBand::Fair => "fair",
            RttBand::Poor => "poor",
            RttBand::Critical => "critical",
        }
    }
}
