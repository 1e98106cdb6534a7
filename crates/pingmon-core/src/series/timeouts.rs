//! Failure markers synchronized with the window bounds
//!
//! Markers are materialized lazily: one is recorded when a failed sample
//! arrives, and pruned once it falls below `current - width`. Widening the
//! window is the only operation that scans history, and that scan is bounded
//! by the width delta.

use super::history::SeriesHistory;
use std::collections::BTreeSet;

/// Set of failed-sample indices currently inside the window
#[derive(Debug, Default, Clone)]
pub struct TimeoutTracker {
    markers: BTreeSet<u64>,
}

impl TimeoutTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure at `index`
    ///
    /// # Returns
    /// `false` if a marker already existed for that index
    pub fn record(&mut self, index: u64) -> bool {
        self.markers.insert(index)
    }

    /// Drop markers with `index < current - width`
    ///
    /// # Returns
    /// Number of markers removed
    pub fn prune(&mut self, current: u64, width: u32) -> usize {
        let floor = current.saturating_sub(u64::from(width));
        let before = self.markers.len();
        self.markers = self.markers.split_off(&floor);
        before - self.markers.len()
    }

    /// Materialize markers for failures that re-enter the window on widening
    ///
    /// Scans `[max(0, current - new_width), current - old_width)`. Indices
    /// that already have a marker are left alone, so repeated calls are
    /// harmless.
    ///
    /// # Returns
    /// Number of markers added
    pub fn backfill(
        &mut self,
        history: &SeriesHistory,
        current: u64,
        old_width: u32,
        new_width: u32,
    ) -> usize {
        if new_width <= old_width || history.is_empty() {
            return 0;
        }

        let from = current.saturating_sub(u64::from(new_width));
        let to = current.saturating_sub(u64::from(old_width));

        let mut added = 0;
        for sample in history.range(from, to).iter().filter(|s| s.is_failure()) {
            if self.markers.insert(sample.index) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, index: u64) -> bool {
        self.markers.contains(&index)
    }

    /// Marker indices in ascending order
    pub fn markers(&self) -> Vec<u64> {
        self.markers.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
