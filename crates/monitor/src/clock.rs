//! Clock sources for timestamp acquisition.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A monotonic millisecond clock.
///
/// Every measurement in the engine is stamped through a `Clock`, which keeps
/// the aggregation logic independent of wall time and lets tests drive time
/// explicitly.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// Clock backed by the runtime's monotonic instant.
///
/// Uses `tokio::time::Instant`, so a paused tokio test runtime also pauses
/// this clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: tokio::time::Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A simulated clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// registry and keep another to advance it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at the given time.
    pub fn starting_at(ms: f64) -> Self {
        let clock = Self::new();
        clock.set_ms(ms);
        clock
    }

    /// Jump to an absolute time.
    pub fn set_ms(&self, ms: f64) {
        self.now_bits.store(ms.to_bits(), Ordering::SeqCst);
    }

    /// Move the clock forward by `ms`.
    pub fn advance_ms(&self, ms: f64) {
        let _ = self
            .now_bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some((f64::from_bits(bits) + ms).to_bits())
            });
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }
}
