//! Append-only sample log
//!
//! The history is the source of truth every derived view is recomputed from.
//! It is never trimmed: at the default 500 ms interval it grows by roughly
//! 170k samples per day, which is accepted in exchange for exact retroactive
//! marker recovery and a full-history median.

use super::sample::Sample;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Ordered, monotonically growing sequence of samples
#[derive(Debug, Default, Clone)]
pub struct SeriesHistory {
    samples: Vec<Sample>,
}

impl SeriesHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new sample, assigning it the next index
    ///
    /// A zero RTT is stored as a failure.
    pub fn append(&mut self, timestamp: DateTime<Utc>, rtt: Option<Duration>) -> Sample {
        let sample = Sample {
            index: self.current_index() + 1,
            timestamp,
            rtt: rtt.filter(|d| !d.is_zero()),
        };
        self.samples.push(sample);
        sample
    }

    /// Index of the newest sample (0 when empty)
    pub fn current_index(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Look up a sample by its 1-based index
    pub fn get(&self, index: u64) -> Option<&Sample> {
        let position = usize::try_from(index.checked_sub(1)?).ok()?;
        self.samples.get(position)
    }

    /// The newest `count` samples, oldest first
    pub fn tail(&self, count: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(count);
        &self.samples[start..]
    }

    /// Samples with indices in `[from, to)`, clamped to what exists
    pub fn range(&self, from: u64, to: u64) -> &[Sample] {
        let len = self.samples.len();
        let start = usize::try_from(from.saturating_sub(1)).map_or(len, |s| s.min(len));
        let end = usize::try_from(to.saturating_sub(1)).map_or(len, |e| e.min(len));
        if start >= end {
            return &[];
        }
        &self.samples[start..end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Timestamp of the newest sample
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|s| s.timestamp)
    }
}
