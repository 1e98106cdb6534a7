//! Multi-threshold latency freshness
//!
//! - Last-satisfied timestamps per threshold ([`tracker`])
//! - Elapsed-time report with severity bands ([`report`])

pub mod report;
pub mod tracker;

pub use report::{format_elapsed, FreshnessBand, FreshnessEntry, FreshnessReport};
pub use tracker::{FreshnessTracker, RESET_SENTINEL_MS, THRESHOLDS_MS};
