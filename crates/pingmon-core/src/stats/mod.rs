//! Summary statistics over the window and the full history
//!
//! - Adaptive median recomputation schedule ([`cadence`])
//! - Max/min/average per tick plus amortized median ([`engine`])

pub mod cadence;
pub mod engine;

pub use cadence::MedianCadence;
pub use engine::{median_of, StatisticsEngine, Summary};
