//! Resizable view over the tail of the sample history
//!
//! The view holds the last `width` samples mapped through a display
//! [`Transform`]. Failed samples become `NaN` rather than being dropped so
//! that x positions stay aligned with sample indices.

use super::history::SeriesHistory;
use crate::monitor::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Numeric mapping from RTT to plotted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Milliseconds as-is
    Identity,
    /// log10 of milliseconds, for charts spanning several orders of magnitude
    #[default]
    Log10,
}

impl Transform {
    /// Map an RTT to its plotted value; failures map to `NaN`
    pub fn apply(self, rtt: Option<Duration>) -> f64 {
        let Some(rtt) = rtt else {
            return f64::NAN;
        };
        let ms = rtt.as_nanos() as f64 / 1_000_000.0;
        let value = match self {
            Transform::Identity => ms,
            Transform::Log10 => ms.log10(),
        };
        if value.is_finite() {
            value
        } else {
            f64::NAN
        }
    }

    /// Map a plotted value back to milliseconds (axis labels, console output)
    pub fn invert(self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Log10 => 10f64.powf(value),
        }
    }
}

impl FromStr for Transform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "linear" => Ok(Transform::Identity),
            "log10" | "log" => Ok(Transform::Log10),
            other => Err(ConfigError::UnknownTransform(other.to_string())),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Identity => write!(f, "identity"),
            Transform::Log10 => write!(f, "log10"),
        }
    }
}

/// Bounded window over the newest samples
#[derive(Debug, Clone)]
pub struct WindowView {
    width: u32,
    transform: Transform,
    /// Transformed values, oldest first; `len == min(history, width)`
    values: Vec<f64>,
    /// Index of the sample behind `values[0]`
    first_index: u64,
}

impl WindowView {
    /// Create an empty view
    pub fn new(width: u32, transform: Transform) -> Self {
        Self {
            width,
            transform,
            values: Vec::with_capacity(width.min(crate::MAX_WINDOW_WIDTH) as usize),
            first_index: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Transformed values currently in view, oldest first
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recompute the view from the newest `width` samples
    pub fn refresh(&mut self, history: &SeriesHistory) {
        let tail = history.tail(self.width as usize);
        self.first_index = tail.first().map_or(0, |s| s.index);
        let transform = self.transform;
        self.values.clear();
        self.values.extend(tail.iter().map(|s| transform.apply(s.rtt)));
    }

    /// Change the width and recompute immediately
    ///
    /// # Returns
    /// The previous width
    pub fn resize(&mut self, width: u32, history: &SeriesHistory) -> u32 {
        let old = std::mem::replace(&mut self.width, width);
        self.refresh(history);
        old
    }

    /// Non-missing values in view
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }

    /// Values left-padded with `NaN` to exactly `width` slots
    pub fn padded(&self) -> Vec<f64> {
        let padding = (self.width as usize).saturating_sub(self.values.len());
        let mut slots = vec![f64::NAN; padding];
        slots.extend_from_slice(&self.values);
        slots
    }

    /// `(sample index, value)` pairs for plotting
    pub fn points(&self) -> Vec<(u64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(offset, &v)| (self.first_index + offset as u64, v))
            .collect()
    }

    /// Exactly `width` `(x, value)` pairs for fixed-size consumers
    ///
    /// Padding slots hold `NaN` and continue the x axis backwards from the
    /// oldest sample in view, so x can reach zero or below early on.
    pub fn padded_points(&self) -> Vec<(i64, f64)> {
        let newest = (self.first_index + self.values.len() as u64).saturating_sub(1);
        let newest = i64::try_from(newest).unwrap_or(i64::MAX);
        let width = i64::from(self.width);
        self.padded()
            .into_iter()
            .enumerate()
            .map(|(slot, v)| (newest - (width - 1 - slot as i64), v))
            .collect()
    }
}
