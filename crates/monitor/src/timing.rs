//! Start/stop timing pairs.

use crate::stats::{RunningStats, TimingStats};
use serde::{Deserialize, Serialize};

/// A single timing or frame-interval observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// When the observation was captured
    pub timestamp_ms: f64,
    /// Elapsed duration, or time since the previous frame
    pub delta_ms: f64,
}

impl Sample {
    /// Create a sample.
    #[inline]
    pub fn new(timestamp_ms: f64, delta_ms: f64) -> Self {
        Self {
            timestamp_ms,
            delta_ms,
        }
    }

    /// Check whether this interval blows the given frame budget.
    #[inline]
    pub fn exceeds(&self, threshold_ms: f64) -> bool {
        self.delta_ms > threshold_ms
    }
}

/// Records start/stop pairs for one scope.
///
/// At most one timing is in flight. A second `start` before `end` replaces
/// the first start time.
#[derive(Debug, Clone, Default)]
pub struct TimingRecorder {
    pending_start: Option<f64>,
    stats: RunningStats,
    last_ms: f64,
}

impl TimingRecorder {
    /// Create an idle recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a timing at `now_ms`.
    ///
    /// Returns `true` when an in-flight timing was overwritten.
    pub fn start(&mut self, now_ms: f64) -> bool {
        self.pending_start.replace(now_ms).is_some()
    }

    /// Finish the in-flight timing.
    ///
    /// Returns `None` without touching any state when nothing was started.
    pub fn end(&mut self, now_ms: f64) -> Option<Sample> {
        let start = self.pending_start.take()?;
        let elapsed = (now_ms - start).max(0.0);

        self.stats.push(elapsed);
        self.last_ms = elapsed;

        Some(Sample::new(now_ms, elapsed))
    }

    /// Check if a timing is in flight.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending_start.is_some()
    }

    /// Duration of the most recently completed timing, or 0.
    #[inline]
    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    /// Summary over all completed timings.
    pub fn stats(&self) -> TimingStats {
        TimingStats::from(&self.stats)
    }

    /// Drop the pending start and all completed timings.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
