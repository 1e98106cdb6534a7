//! Pingmon - network latency monitor
//!
//! This library re-exports the core monitoring engine from `pingmon-core`
//! and adds the pieces the console binary needs: persisted configuration
//! and terminal rendering of snapshots.

pub mod config;
pub mod render;

pub use pingmon_core::{band, freshness, monitor, probe, series, stats};

pub use pingmon_core::{FreshnessTracker, MonitorConfig, MonitorState, SampleSource, TcpProbe};
pub use pingmon_core::{DEFAULT_INTERVAL_MS, DEFAULT_WINDOW_WIDTH, MAX_WINDOW_WIDTH, VERSION};
