//! Statistics engine
//!
//! Max, min and average are recomputed over the window's valid values on
//! every tick, which is O(width). The median covers every valid value in the
//! full history and is only recomputed when the [`MedianCadence`] says so.

use super::cadence::MedianCadence;
use crate::series::{SeriesHistory, WindowView};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Summary statistics in transformed (plotted) units
///
/// Every field is `None` until at least one valid value exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub average: Option<f64>,
    /// Full-history median as of the last recomputation
    pub median: Option<f64>,
}

impl Summary {
    /// True when no statistic is defined
    pub fn is_empty(&self) -> bool {
        self.max.is_none() && self.min.is_none() && self.average.is_none() && self.median.is_none()
    }
}

/// Median of the given values
///
/// Even counts average the two central elements. Returns `None` when empty.
pub fn median_of(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Running statistics plus the adaptive median
#[derive(Debug, Clone, Default)]
pub struct StatisticsEngine {
    cadence: MedianCadence,
    summary: Summary,
    /// Number of median recomputations so far
    median_runs: u64,
}

impl StatisticsEngine {
    /// Create an engine whose median cadence starts at `cadence_base`
    pub fn new(cadence_base: u64) -> Self {
        Self {
            cadence: MedianCadence::new(cadence_base),
            summary: Summary::default(),
            median_runs: 0,
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn cadence(&self) -> MedianCadence {
        self.cadence
    }

    pub fn median_runs(&self) -> u64 {
        self.median_runs
    }

    /// Fold in the tick at `index`
    ///
    /// # Returns
    /// `true` if the median was recomputed on this tick
    pub fn update(&mut self, index: u64, window: &WindowView, history: &SeriesHistory) -> bool {
        self.refresh_window(window);

        let recomputed = self.cadence.is_due(index);
        if recomputed {
            self.recompute_median(window, history);
            debug!(index, factor = self.cadence.factor(), "Median calculation");
        }

        if self.cadence.advance(index) {
            debug!(index, factor = self.cadence.factor(), "Median cadence grew");
        }

        recomputed
    }

    /// Recompute max/min/average over the window only
    pub fn refresh_window(&mut self, window: &WindowView) {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;

        for value in window.valid_values() {
            count += 1;
            sum += value;
            max = max.max(value);
            min = min.min(value);
        }

        if count == 0 {
            self.summary.max = None;
            self.summary.min = None;
            self.summary.average = None;
        } else {
            self.summary.max = Some(max);
            self.summary.min = Some(min);
            self.summary.average = Some(sum / count as f64);
        }
    }

    /// Recompute the median over every valid value in history
    pub fn recompute_median(&mut self, window: &WindowView, history: &SeriesHistory) {
        let transform = window.transform();
        let values: Vec<f64> = history
            .iter()
            .map(|s| transform.apply(s.rtt))
            .filter(|v| !v.is_nan())
            .collect();
        self.summary.median = median_of(values);
        self.median_runs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Transform;
    use approx::assert_relative_eq;
    use chrono::Utc;
    use std::time::Duration;

    struct Fixture {
        history: SeriesHistory,
        window: WindowView,
        engine: StatisticsEngine,
    }

    impl Fixture {
        fn new(width: u32) -> Self {
            Self {
                history: SeriesHistory::new(),
                window: WindowView::new(width, Transform::Identity),
                engine: StatisticsEngine::new(10),
            }
        }

        fn push(&mut self, rtt_ms: Option<u64>) -> bool {
            let sample = self
                .history
                .append(Utc::now(), rtt_ms.map(Duration::from_millis));
            self.window.refresh(&self.history);
            self.engine.update(sample.index, &self.window, &self.history)
        }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median_of(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median_of(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median_of(vec![7.0]), Some(7.0));
        assert_eq!(median_of(Vec::new()), None);
    }

    #[test]
    fn test_window_statistics() {
        let mut fx = Fixture::new(10);
        for rtt in 1..=15 {
            fx.push(Some(rtt));
        }
        let summary = fx.engine.summary();
        assert_eq!(summary.max, Some(15.0));
        assert_eq!(summary.min, Some(6.0));
        assert_relative_eq!(summary.average.unwrap(), 10.5);
    }

    #[test]
    fn test_failures_excluded() {
        let mut fx = Fixture::new(4);
        fx.push(Some(10));
        fx.push(None);
        fx.push(Some(30));
        let summary = fx.engine.summary();
        assert_eq!(summary.max, Some(30.0));
        assert_eq!(summary.min, Some(10.0));
        assert_eq!(summary.average, Some(20.0));
    }

    #[test]
    fn test_all_failure_window_is_empty() {
        let mut fx = Fixture::new(3);
        fx.push(Some(10));
        for _ in 0..3 {
            fx.push(None);
        }
        let summary = fx.engine.summary();
        assert_eq!(summary.max, None);
        assert_eq!(summary.min, None);
        assert_eq!(summary.average, None);
    }

    #[test]
    fn test_no_samples_no_statistics() {
        let engine = StatisticsEngine::new(10);
        assert!(engine.summary().is_empty());
    }

    #[test]
    fn test_median_only_on_cadence_ticks() {
        let mut fx = Fixture::new(5);
        for index in 1..=9u64 {
            assert!(!fx.push(Some(index)));
        }
        assert_eq!(fx.engine.summary().median, None);

        assert!(fx.push(Some(10)));
        // Full history 1..=10, not just the window
        assert_eq!(fx.engine.summary().median, Some(5.5));

        // Stale until the next multiple of the factor
        fx.push(Some(1000));
        assert_eq!(fx.engine.summary().median, Some(5.5));
    }

    #[test]
    fn test_median_recomputations_thin_out() {
        let mut fx = Fixture::new(10);
        let mut recomputed_at = Vec::new();
        for index in 1..=300u64 {
            if fx.push(Some(index)) {
                recomputed_at.push(index);
            }
        }
        // Every 10 ticks up to 100, then every 100
        let expected: Vec<u64> = (1..=10).map(|k| k * 10).chain([200, 300]).collect();
        assert_eq!(recomputed_at, expected);
        assert_eq!(fx.engine.cadence().factor(), 100);
        assert_eq!(fx.engine.median_runs(), 12);
    }

    #[test]
    fn test_median_without_valid_values_is_absent() {
        let mut fx = Fixture::new(5);
        for _ in 0..10 {
            fx.push(None);
        }
        assert_eq!(fx.engine.median_runs(), 1);
        assert_eq!(fx.engine.summary().median, None);
    }
}
