//! Sample history and the views derived from it
//!
//! - Immutable probe samples ([`sample`])
//! - Append-only sample log ([`history`])
//! - Resizable transformed window over the history tail ([`window`])
//! - Failure markers kept in step with the window ([`timeouts`])

pub mod history;
pub mod sample;
pub mod timeouts;
pub mod window;

pub use history::SeriesHistory;
pub use sample::Sample;
pub use timeouts::TimeoutTracker;
pub use window::{Transform, WindowView};
