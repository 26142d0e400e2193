//! Frame scheduling drivers.
//!
//! A [`FrameScheduler`] stands in for the host's "run this once per rendered
//! frame" primitive. Each started loop is owned through a [`FrameLoop`]
//! handle; cancelling or dropping the handle ends the loop. A callback
//! returning `false` also ends its loop, which is how a loop notices that
//! its sampling session was stopped underneath it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::MissedTickBehavior;

/// Invoked once per frame. Return `false` to end the loop.
pub type FrameCallback = Box<dyn FnMut() -> bool + Send + 'static>;

/// Host capability for per-frame callbacks.
pub trait FrameScheduler: Send + Sync + fmt::Debug {
    /// Start calling `on_frame` once per frame.
    ///
    /// Returns `None` when the host cannot deliver frames.
    fn start(&self, on_frame: FrameCallback) -> Option<FrameLoop>;
}

/// Cancellation handle for a running frame loop.
///
/// Dropping the handle cancels the loop.
#[derive(Debug)]
pub struct FrameLoop {
    cancel: Option<oneshot::Sender<()>>,
}

impl FrameLoop {
    /// Wrap the sending half of a cancellation channel.
    pub fn new(cancel: oneshot::Sender<()>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    /// Check if the loop is still listening for cancellation.
    pub fn is_active(&self) -> bool {
        self.cancel.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Stop the loop.
    pub fn cancel(mut self) {
        self.signal();
    }

    fn signal(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.signal();
    }
}

/// Drives frames from a tokio interval timer.
///
/// Only works inside a tokio runtime with a non-zero period; otherwise
/// `start` returns `None`.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    period: Duration,
}

impl IntervalScheduler {
    /// Create a scheduler ticking every `period`.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl FrameScheduler for IntervalScheduler {
    fn start(&self, mut on_frame: FrameCallback) -> Option<FrameLoop> {
        if self.period.is_zero() {
            tracing::warn!(target: "telemetry::scheduler", "zero frame period; interval frame loop unavailable");
            return None;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    target: "telemetry::scheduler",
                    "no tokio runtime; interval frame loop unavailable"
                );
                return None;
            }
        };

        let period = self.period;
        let (tx, mut rx) = oneshot::channel::<()>();

        handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; frames start one period in.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut rx => {
                        tracing::trace!(target: "telemetry::scheduler", "frame loop cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !on_frame() {
                            tracing::trace!(target: "telemetry::scheduler", "frame loop ended by callback");
                            break;
                        }
                    }
                }
            }
        });

        Some(FrameLoop::new(tx))
    }
}

/// Scheduler for hosts without any frame primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrameScheduler;

impl FrameScheduler for NoFrameScheduler {
    fn start(&self, _on_frame: FrameCallback) -> Option<FrameLoop> {
        None
    }
}

struct PumpEntry {
    callback: FrameCallback,
    cancel: oneshot::Receiver<()>,
}

impl PumpEntry {
    fn is_active(&mut self) -> bool {
        matches!(self.cancel.try_recv(), Err(TryRecvError::Empty))
    }
}

/// Scheduler driven by the host's own render loop.
///
/// The host calls [`FramePump::tick`] once per rendered frame; every live
/// loop gets one callback per tick, in registration order. Clones share the
/// same set of loops.
#[derive(Clone, Default)]
pub struct FramePump {
    entries: Arc<Mutex<Vec<PumpEntry>>>,
}

impl FramePump {
    /// Create a pump with no loops.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one frame to every live loop and return how many remain.
    pub fn tick(&self) -> usize {
        // Callbacks run without the pump lock held so they may start new loops.
        let mut entries = std::mem::take(&mut *lock(&self.entries));
        entries.retain_mut(|entry| entry.is_active() && (entry.callback)());

        let mut guard = lock(&self.entries);
        entries.append(&mut guard);
        *guard = entries;
        guard.len()
    }

    /// Number of registered loops, including cancelled ones not yet pruned.
    pub fn loop_count(&self) -> usize {
        lock(&self.entries).len()
    }
}

impl fmt::Debug for FramePump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePump")
            .field("loops", &self.loop_count())
            .finish()
    }
}

impl FrameScheduler for FramePump {
    fn start(&self, on_frame: FrameCallback) -> Option<FrameLoop> {
        let (tx, rx) = oneshot::channel();
        lock(&self.entries).push(PumpEntry {
            callback: on_frame,
            cancel: rx,
        });
        Some(FrameLoop::new(tx))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
