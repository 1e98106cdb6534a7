//! The monitor controller
//!
//! [`MonitorState`] owns the sample history and every structure derived from
//! it. Each processed probe runs the same fixed pipeline:
//!
//! ```text
//! reply → history → window → timeout markers → statistics → freshness
//! ```
//!
//! Derivation only flows from history to views, so a resize can always be
//! served by recomputing from history.
//!
//! # Example
//! ```
//! use pingmon_core::monitor::{MonitorConfig, MonitorState};
//! use pingmon_core::probe::ProbeReply;
//! use pingmon_core::series::Transform;
//! use std::time::Duration;
//!
//! let mut monitor = MonitorState::new(MonitorConfig {
//!     window_width: 3,
//!     transform: Transform::Identity,
//!     ..Default::default()
//! });
//! for ms in [10, 20, 30, 40] {
//!     monitor.process(ProbeReply::success(Duration::from_millis(ms)));
//! }
//! assert_eq!(monitor.window().values(), &[20.0, 30.0, 40.0]);
//! assert_eq!(monitor.statistics().max, Some(40.0));
//! ```

use crate::band::RttBand;
use crate::freshness::{FreshnessReport, FreshnessTracker};
use crate::probe::ProbeReply;
use crate::series::{SeriesHistory, TimeoutTracker, Transform, WindowView};
use crate::stats::cadence::DEFAULT_CADENCE_BASE;
use crate::stats::{StatisticsEngine, Summary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Rejected reconfiguration input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Not a number: {0:?}")]
    InvalidNumber(String),

    #[error("Window width {value} exceeds maximum {max}")]
    WidthOutOfRange { value: u32, max: u32 },

    #[error("Unknown transform: {0}")]
    UnknownTransform(String),
}

/// Parse a window width selection
pub fn parse_width(value: &str) -> Result<u32, ConfigError> {
    let width: u32 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(value.to_string()))?;
    if width > crate::MAX_WINDOW_WIDTH {
        return Err(ConfigError::WidthOutOfRange {
            value: width,
            max: crate::MAX_WINDOW_WIDTH,
        });
    }
    Ok(width)
}

fn default_window_width() -> u32 {
    crate::DEFAULT_WINDOW_WIDTH
}

fn default_cadence_base() -> u64 {
    DEFAULT_CADENCE_BASE
}

/// Monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Number of newest samples in the window
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Display transform applied to RTTs
    #[serde(default)]
    pub transform: Transform,
    /// Initial median cadence factor
    #[serde(default = "default_cadence_base")]
    pub cadence_base: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            transform: Transform::default(),
            cadence_base: default_cadence_base(),
        }
    }
}

/// What one processed probe changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Index assigned to the new sample
    pub index: u64,
    /// Whether the sample was a failure
    pub failed: bool,
    /// Whether the full-history median was recomputed
    pub median_recomputed: bool,
    /// Markers dropped from the window
    pub pruned: usize,
}

/// Copy of the derived views for asynchronous consumers
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub index: u64,
    pub window_width: u32,
    pub transform: Transform,
    /// Exactly `window_width` `(x, transformed value)` pairs, oldest first.
    /// Failures and left padding serialize as null.
    pub series: Vec<(i64, f64)>,
    /// Failed-sample indices currently in the window
    pub markers: Vec<u64>,
    pub summary: Summary,
    /// Vertical axis hint `(low, high)`, absent without statistics
    pub y_limits: Option<(f64, f64)>,
    pub median_factor: u64,
    pub freshness: FreshnessReport,
    pub last_rtt_ms: Option<f64>,
    pub last_band: Option<RttBand>,
    pub taken_at: DateTime<Utc>,
}

/// Single owner of the history and all derived views
#[derive(Debug, Clone)]
pub struct MonitorState {
    config: MonitorConfig,
    history: SeriesHistory,
    window: WindowView,
    timeouts: TimeoutTracker,
    stats: StatisticsEngine,
    freshness: FreshnessTracker,
}

impl MonitorState {
    /// Create a monitor with freshness stamped now
    pub fn new(config: MonitorConfig) -> Self {
        Self::starting_at(config, Utc::now())
    }

    /// Create a monitor with freshness stamped at `start`
    ///
    /// Widths above [`MAX_WINDOW_WIDTH`](crate::MAX_WINDOW_WIDTH) are clamped.
    pub fn starting_at(mut config: MonitorConfig, start: DateTime<Utc>) -> Self {
        config.window_width = config.window_width.min(crate::MAX_WINDOW_WIDTH);
        Self {
            config,
            history: SeriesHistory::new(),
            window: WindowView::new(config.window_width, config.transform),
            timeouts: TimeoutTracker::new(),
            stats: StatisticsEngine::new(config.cadence_base),
            freshness: FreshnessTracker::starting_at(start),
        }
    }

    /// Fold one probe reply into every view
    pub fn process(&mut self, reply: ProbeReply) -> TickOutcome {
        let sample = self.history.append(reply.timestamp, reply.measured_rtt());
        let index = sample.index;
        let failed = sample.is_failure();

        self.window.refresh(&self.history);

        if failed {
            self.timeouts.record(index);
        }
        let pruned = self.timeouts.prune(index, self.window.width());

        let median_recomputed = self.stats.update(index, &self.window, &self.history);

        self.freshness
            .update_at(sample.freshness_measurement(), sample.timestamp);

        TickOutcome {
            index,
            failed,
            median_recomputed,
            pruned,
        }
    }

    /// Append a failed sample immediately (manual timeout)
    pub fn inject_failure(&mut self) -> TickOutcome {
        self.process(ProbeReply::failure())
    }

    /// Change the window width and resynchronize markers and statistics
    ///
    /// Widening recovers markers for failures that re-enter the window;
    /// narrowing prunes the ones that leave it.
    pub fn resize(&mut self, width: u32) {
        let width = width.min(crate::MAX_WINDOW_WIDTH);
        let current = self.history.current_index();
        let old = self.window.resize(width, &self.history);
        self.config.window_width = width;

        if width > old {
            let added = self.timeouts.backfill(&self.history, current, old, width);
            info!(old, new = width, recovered = added, "Window widened");
        } else if width < old {
            let pruned = self.timeouts.prune(current, width);
            info!(old, new = width, pruned, "Window narrowed");
        }

        self.stats.refresh_window(&self.window);
    }

    /// Apply a width selection from the boundary
    ///
    /// Invalid input is ignored and the current width is kept.
    ///
    /// # Returns
    /// `true` if the selection was applied
    pub fn apply_width_selection(&mut self, value: &str) -> bool {
        match parse_width(value) {
            Ok(width) => {
                self.resize(width);
                true
            }
            Err(e) => {
                debug!(value, error = %e, "Ignoring window width selection");
                false
            }
        }
    }

    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    pub fn history(&self) -> &SeriesHistory {
        &self.history
    }

    pub fn window(&self) -> &WindowView {
        &self.window
    }

    pub fn timeouts(&self) -> &TimeoutTracker {
        &self.timeouts
    }

    pub fn freshness(&self) -> &FreshnessTracker {
        &self.freshness
    }

    /// Index of the newest sample (0 before the first tick)
    pub fn current_index(&self) -> u64 {
        self.history.current_index()
    }

    pub fn width(&self) -> u32 {
        self.window.width()
    }

    pub fn statistics(&self) -> Summary {
        self.stats.summary()
    }

    pub fn median_factor(&self) -> u64 {
        self.stats.cadence().factor()
    }

    /// `(sample index, value)` pairs in view
    pub fn series(&self) -> Vec<(u64, f64)> {
        self.window.points()
    }

    /// Failure marker indices in ascending order
    pub fn markers(&self) -> Vec<u64> {
        self.timeouts.markers()
    }

    /// RTT of the newest sample, `None` if it failed or nothing ran yet
    pub fn last_rtt(&self) -> Option<Duration> {
        self.history.get(self.current_index()).and_then(|s| s.rtt)
    }

    /// Band of the newest sample
    pub fn last_band(&self) -> Option<RttBand> {
        self.history
            .get(self.current_index())
            .map(|s| RttBand::from_rtt(s.rtt))
    }

    /// Vertical axis limits padded around min/max
    pub fn y_limits(&self) -> Option<(f64, f64)> {
        let summary = self.stats.summary();
        let (min, max) = (summary.min?, summary.max?);
        Some(((min * 0.95).min(0.95), (max * 1.05).max(2.05)))
    }

    pub fn freshness_report(&self, now: DateTime<Utc>, short_view: bool) -> FreshnessReport {
        self.freshness.report(now, short_view)
    }

    /// Copy out everything a renderer needs
    pub fn snapshot(&self, now: DateTime<Utc>, short_view: bool) -> MonitorSnapshot {
        let last = self.history.get(self.current_index());
        MonitorSnapshot {
            index: self.current_index(),
            window_width: self.width(),
            transform: self.config.transform,
            series: self.window.padded_points(),
            markers: self.markers(),
            summary: self.statistics(),
            y_limits: self.y_limits(),
            median_factor: self.median_factor(),
            freshness: self.freshness_report(now, short_view),
            last_rtt_ms: last.and_then(|s| s.rtt_ms()),
            last_band: last.map(|s| RttBand::from_rtt(s.rtt)),
            taken_at: now,
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}
