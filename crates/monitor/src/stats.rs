//! Bounded-memory statistics over streams of millisecond samples.

use serde::{Deserialize, Serialize};

/// Running aggregate of a sample stream.
///
/// Only count, sum, min and max are kept, so a session can run indefinitely
/// without growing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the aggregate.
    ///
    /// Non-finite values are ignored.
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Number of samples folded so far.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of all samples.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest sample, or 0 when empty.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest sample, or 0 when empty.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Arithmetic mean, or 0 when empty.
    ///
    /// Clamped into `[min, max]` so float rounding in the sum can never push
    /// the mean outside the observed range.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum / self.count as f64).clamp(self.min, self.max)
    }

    /// Check if no samples have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Forget every sample.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Statistical summary of timing data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    /// Number of samples
    pub count: u64,
    /// Mean time in milliseconds
    pub average_ms: f64,
    /// Minimum time in milliseconds
    pub min_ms: f64,
    /// Maximum time in milliseconds
    pub max_ms: f64,
    /// Total time in milliseconds
    pub total_ms: f64,
}

impl From<&RunningStats> for TimingStats {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            average_ms: stats.mean(),
            min_ms: stats.min(),
            max_ms: stats.max(),
            total_ms: stats.sum(),
        }
    }
}
