//! Adaptive median cadence
//!
//! The full-history median is recomputed every `factor` ticks. Once the
//! current index passes `factor * 10`, the factor grows tenfold, so sorting
//! cost stays amortized while the median gets proportionally staler.

/// Growth multiplier applied to the factor
pub const CADENCE_GROWTH: u64 = 10;

/// Starting factor
pub const DEFAULT_CADENCE_BASE: u64 = 10;

/// Schedule for full-history median recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianCadence {
    factor: u64,
}

impl MedianCadence {
    /// Create a cadence starting at `base` ticks (at least 1)
    pub fn new(base: u64) -> Self {
        Self {
            factor: base.max(1),
        }
    }

    pub fn factor(&self) -> u64 {
        self.factor
    }

    /// Whether the median is due at `index`
    pub fn is_due(&self, index: u64) -> bool {
        index > 0 && index % self.factor == 0
    }

    /// Grow the factor if `index` has passed `factor * 10`
    ///
    /// # Returns
    /// `true` if the factor grew
    pub fn advance(&mut self, index: u64) -> bool {
        let threshold = self.factor.saturating_mul(CADENCE_GROWTH);
        if index > threshold && threshold < u64::MAX {
            self.factor = threshold;
            true
        } else {
            false
        }
    }
}

impl Default for MedianCadence {
    fn default() -> Self {
        Self::new(DEFAULT_CADENCE_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factor() {
        assert_eq!(MedianCadence::default().factor(), 10);
        assert_eq!(MedianCadence::new(0).factor(), 1);
    }

    #[test]
    fn test_due_on_multiples() {
        let cadence = MedianCadence::default();
        assert!(!cadence.is_due(0));
        assert!(!cadence.is_due(9));
        assert!(cadence.is_due(10));
        assert!(cadence.is_due(100));
        assert!(!cadence.is_due(101));
    }

    #[test]
    fn test_grows_first_time_index_exceeds_threshold() {
        let mut cadence = MedianCadence::default();
        for index in 1..=100 {
            assert!(!cadence.advance(index), "grew early at {}", index);
        }
        assert!(cadence.advance(101));
        assert_eq!(cadence.factor(), 100);

        for index in 102..=1000 {
            cadence.advance(index);
        }
        assert_eq!(cadence.factor(), 100);
        assert!(cadence.advance(1001));
        assert_eq!(cadence.factor(), 1000);
    }

    #[test]
    fn test_factor_never_decreases() {
        let mut cadence = MedianCadence::default();
        let mut last = cadence.factor();
        for index in 1..=20_000 {
            cadence.advance(index);
            assert!(cadence.factor() >= last);
            last = cadence.factor();
        }
        assert_eq!(cadence.factor(), 10_000);
    }
}
