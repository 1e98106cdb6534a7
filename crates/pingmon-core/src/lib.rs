//! Pingmon Core - latency history, windowing, statistics and freshness
//!
//! This library turns a stream of round-trip-time probes into the views a
//! live latency chart needs: a resizable window over the sample history,
//! failure markers kept in step with that window, summary statistics with an
//! amortized full-history median, and a per-threshold freshness tracker.

pub mod band;
pub mod freshness;
pub mod monitor;
pub mod probe;
pub mod series;
pub mod stats;

pub use freshness::{FreshnessReport, FreshnessTracker};
pub use monitor::{MonitorConfig, MonitorSnapshot, MonitorState};
pub use probe::{ProbeError, ProbeReply, SampleSource, TcpProbe, TickSchedule};
pub use series::{Sample, SeriesHistory, TimeoutTracker, Transform, WindowView};
pub use stats::{MedianCadence, StatisticsEngine, Summary};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date stamped by build.rs
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Default number of samples visible in the window
pub const DEFAULT_WINDOW_WIDTH: u32 = 10;

/// Largest window width accepted from a selection string
pub const MAX_WINDOW_WIDTH: u32 = 600;

/// Default tick interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Default back-off after a probe fault in milliseconds
pub const DEFAULT_BACKOFF_MS: u64 = 1000;
