//! Freshness report rendering
//!
//! Pure formatting of tracker state: no clocks are read here, the caller
//! supplies `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity band for how recently a threshold was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessBand {
    /// More than 30 s ago
    Stale,
    /// More than 10 s ago
    Cooling,
    /// More than 5 s ago
    Warm,
    /// Within the last 5 s
    Hot,
}

/// Lower bounds (exclusive, seconds) checked in order
const BAND_TABLE: [(f64, FreshnessBand); 3] = [
    (30.0, FreshnessBand::Stale),
    (10.0, FreshnessBand::Cooling),
    (5.0, FreshnessBand::Warm),
];

impl FreshnessBand {
    pub fn from_elapsed(elapsed_secs: f64) -> Self {
        BAND_TABLE
            .iter()
            .find(|(bound, _)| elapsed_secs > *bound)
            .map_or(FreshnessBand::Hot, |&(_, band)| band)
    }
}

/// Compact elapsed time: `"07s "`, `"12+m"`, `"03+h"`, `"02+d"`
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let secs = elapsed_secs.max(0.0);
    if secs < 60.0 {
        format!("{:02}s ", secs.round_ties_even() as i64)
    } else if secs < 3600.0 {
        format!("{:02}+m", (secs / 60.0).round_ties_even() as i64)
    } else if secs < 86400.0 {
        format!("{:02}+h", (secs / 3600.0).round_ties_even() as i64)
    } else {
        format!("{:02}+d", (secs / 86400.0).round_ties_even() as i64)
    }
}

/// One threshold line of the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreshnessEntry {
    pub threshold_ms: u64,
    pub elapsed_secs: f64,
    pub band: FreshnessBand,
}

impl fmt::Display for FreshnessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} | ",
            self.threshold_ms,
            format_elapsed(self.elapsed_secs)
        )
    }
}

/// Ordered per-threshold staleness
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreshnessReport {
    pub entries: Vec<FreshnessEntry>,
}

impl FreshnessReport {
    /// Build a report from `(threshold, last satisfied)` pairs
    ///
    /// `short_view` keeps every other threshold, starting with the first.
    pub fn build(
        buckets: impl IntoIterator<Item = (u64, DateTime<Utc>)>,
        now: DateTime<Utc>,
        short_view: bool,
    ) -> Self {
        let entries = buckets
            .into_iter()
            .enumerate()
            .filter(|(position, _)| !short_view || position % 2 == 0)
            .map(|(_, (threshold_ms, seen))| {
                let elapsed_secs = ((now - seen).num_milliseconds() as f64 / 1000.0).max(0.0);
                FreshnessEntry {
                    threshold_ms,
                    elapsed_secs,
                    band: FreshnessBand::from_elapsed(elapsed_secs),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[FreshnessEntry] {
        &self.entries
    }
}

impl fmt::Display for FreshnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(FreshnessBand::from_elapsed(31.0), FreshnessBand::Stale);
        assert_eq!(FreshnessBand::from_elapsed(30.0), FreshnessBand::Cooling);
        assert_eq!(FreshnessBand::from_elapsed(10.5), FreshnessBand::Cooling);
        assert_eq!(FreshnessBand::from_elapsed(10.0), FreshnessBand::Warm);
        assert_eq!(FreshnessBand::from_elapsed(5.1), FreshnessBand::Warm);
        assert_eq!(FreshnessBand::from_elapsed(5.0), FreshnessBand::Hot);
        assert_eq!(FreshnessBand::from_elapsed(0.0), FreshnessBand::Hot);
    }

    #[test]
    fn test_format_elapsed_granularity() {
        assert_eq!(format_elapsed(7.0), "07s ");
        assert_eq!(format_elapsed(59.4), "59s ");
        assert_eq!(format_elapsed(90.0), "02+m");
        assert_eq!(format_elapsed(720.0), "12+m");
        assert_eq!(format_elapsed(10_800.0), "03+h");
        assert_eq!(format_elapsed(2.0 * 86400.0), "02+d");
        assert_eq!(format_elapsed(-1.0), "00s ");
    }

    #[test]
    fn test_rounds_half_to_even() {
        assert_eq!(format_elapsed(2.5), "02s ");
        assert_eq!(format_elapsed(3.5), "04s ");
    }

    #[test]
    fn test_report_full_and_short() {
        let now = Utc::now();
        let buckets = vec![
            (0, now - Duration::seconds(40)),
            (25, now - Duration::seconds(12)),
            (50, now - Duration::seconds(6)),
            (75, now),
        ];

        let full = FreshnessReport::build(buckets.clone(), now, false);
        let bands: Vec<FreshnessBand> = full.entries().iter().map(|e| e.band).collect();
        assert_eq!(
            bands,
            vec![
                FreshnessBand::Stale,
                FreshnessBand::Cooling,
                FreshnessBand::Warm,
                FreshnessBand::Hot
            ]
        );
        assert_eq!(full.to_string(), "0:40s  | 25:12s  | 50:06s  | 75:00s  | ");

        let short = FreshnessReport::build(buckets, now, true);
        let keys: Vec<u64> = short.entries().iter().map(|e| e.threshold_ms).collect();
        assert_eq!(keys, vec![0, 50]);
    }
}
