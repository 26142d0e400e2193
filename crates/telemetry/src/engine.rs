//! The performance engine facade.
//!
//! [`PerfEngine`] is the single context object UI layers talk to. It owns
//! the scope registry, the frame scheduler and one frame loop per sampling
//! scope. Every operation is synchronous and infallible; anomalies such as
//! unmatched timings, double starts or a missing frame primitive degrade to
//! no-ops or zeroed metrics.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use monitor::{ManualClock, MonitorConfig, MonitorRegistry, NoHeapProbe};
//! use telemetry::{FramePump, PerfEngine};
//!
//! let clock = ManualClock::new();
//! let pump = FramePump::new();
//! let registry = MonitorRegistry::new(MonitorConfig::default())
//!     .with_clock(Arc::new(clock.clone()))
//!     .with_heap_probe(Arc::new(NoHeapProbe));
//! let engine = PerfEngine::with_registry(registry).with_scheduler(Arc::new(pump.clone()));
//!
//! engine.start_monitoring("feed");
//! for _ in 0..3 {
//!     clock.advance_ms(16.0);
//!     pump.tick();
//! }
//! engine.stop_monitoring("feed");
//!
//! assert_eq!(engine.metrics("feed").sample_count, 3);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use monitor::{MetricsSummary, MonitorConfig, MonitorRegistry, SamplingToken};

use crate::recommend::{recommend_with, Advisory};
use crate::report::{export_report, PerfReport};
use crate::scheduler::{FrameCallback, FrameLoop, FrameScheduler, IntervalScheduler};
use crate::thresholds::Thresholds;

/// Registry handle shared between the engine and its frame loops.
pub type SharedRegistry = Arc<Mutex<MonitorRegistry>>;

#[derive(Debug)]
struct ActiveLoop {
    token: SamplingToken,
    frame_loop: FrameLoop,
}

/// Performance telemetry engine.
#[derive(Debug)]
pub struct PerfEngine {
    registry: SharedRegistry,
    scheduler: Arc<dyn FrameScheduler>,
    thresholds: Thresholds,
    loops: Mutex<HashMap<String, ActiveLoop>>,
}

impl PerfEngine {
    /// Create an engine sampling frames from a tokio interval timer.
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_registry(MonitorRegistry::new(config))
    }

    /// Create an engine around an existing registry.
    ///
    /// Frames come from a tokio interval at the registry's configured period.
    pub fn with_registry(registry: MonitorRegistry) -> Self {
        let scheduler = IntervalScheduler::new(registry.config().frame_interval());
        Self {
            registry: Arc::new(Mutex::new(registry)),
            scheduler: Arc::new(scheduler),
            thresholds: Thresholds::default(),
            loops: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the frame scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn FrameScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the recommendation thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Shared handle to the underlying registry.
    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Active recommendation thresholds.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    // -------------------------------------------------------------------------
    // Timing
    // -------------------------------------------------------------------------

    /// Begin timing `scope`. A second start before the end replaces the first.
    pub fn start_timing(&self, scope: &str) {
        lock(&self.registry).start_timing(scope);
    }

    /// Finish timing `scope`, returning the elapsed milliseconds.
    ///
    /// Without a matching start this is a no-op returning `None`.
    pub fn end_timing(&self, scope: &str) -> Option<f64> {
        lock(&self.registry).end_timing(scope)
    }

    /// Begin timing a screen load.
    pub fn start_screen_load(&self, screen: &str) {
        self.start_timing(screen);
    }

    /// Finish timing a screen load.
    pub fn end_screen_load(&self, screen: &str) -> Option<f64> {
        self.end_timing(screen)
    }

    /// Time `scope` until the returned guard is dropped or finished.
    pub fn time_scope(&self, scope: impl Into<String>) -> TimingGuard<'_> {
        let scope = scope.into();
        self.start_timing(&scope);
        TimingGuard {
            engine: self,
            scope: Some(scope),
        }
    }

    // -------------------------------------------------------------------------
    // Frame sampling
    // -------------------------------------------------------------------------

    /// Start frame sampling for `scope`.
    ///
    /// Returns `true` while a frame loop is feeding the scope. Starting a
    /// scope that is already sampling changes nothing. When the scheduler
    /// cannot deliver frames the scope's frame metrics stay zeroed and this
    /// returns `false`.
    pub fn start_monitoring(&self, scope: &str) -> bool {
        let mut loops = lock(&self.loops);
        let token = lock(&self.registry).start_monitoring(scope);

        if let Some(active) = loops.get(scope) {
            if active.token == token && active.frame_loop.is_active() {
                tracing::debug!(target: "telemetry::engine", scope, "already monitoring");
                return true;
            }
        }

        let registry = Arc::clone(&self.registry);
        let name = scope.to_string();
        let on_frame: FrameCallback = Box::new(move || lock(&registry).record_frame(&name, token));

        match self.scheduler.start(on_frame) {
            Some(frame_loop) => {
                loops.insert(scope.to_string(), ActiveLoop { token, frame_loop });
                tracing::debug!(target: "telemetry::engine", scope, "monitoring started");
                true
            }
            None => {
                loops.remove(scope);
                lock(&self.registry).disable_sampling(scope);
                false
            }
        }
    }

    /// Stop frame sampling for `scope` and freeze its frame rate.
    pub fn stop_monitoring(&self, scope: &str) {
        if let Some(active) = lock(&self.loops).remove(scope) {
            active.frame_loop.cancel();
        }
        if lock(&self.registry).stop_monitoring(scope) {
            tracing::debug!(target: "telemetry::engine", scope, "monitoring stopped");
        }
    }

    /// Check if a frame loop is feeding `scope`.
    pub fn is_monitoring(&self, scope: &str) -> bool {
        let loops = lock(&self.loops);
        match loops.get(scope) {
            Some(active) => {
                active.frame_loop.is_active() && lock(&self.registry).is_live(scope, active.token)
            }
            None => false,
        }
    }

    /// Count a scroll event in `scope`.
    pub fn record_scroll_event(&self, scope: &str) {
        lock(&self.registry).record_scroll_event(scope);
    }

    /// Report the list state of `scope`.
    pub fn update_list_metrics(&self, scope: &str, total: u64, visible: u64, rendered: u64) {
        lock(&self.registry).update_list_metrics(scope, total, visible, rendered);
    }

    // -------------------------------------------------------------------------
    // Reading and export
    // -------------------------------------------------------------------------

    /// Snapshot `scope`.
    pub fn metrics(&self, scope: &str) -> MetricsSummary {
        lock(&self.registry).metrics(scope)
    }

    /// Advisories for `scope`, in threshold-table order.
    pub fn recommendations(&self, scope: &str) -> Vec<Advisory> {
        recommend_with(&self.metrics(scope), &self.thresholds)
    }

    /// Advisory messages for `scope`.
    pub fn performance_recommendations(&self, scope: &str) -> Vec<String> {
        self.recommendations(scope)
            .iter()
            .map(Advisory::message)
            .collect()
    }

    /// Report for `scope`, captured now.
    pub fn export_report(&self, scope: &str) -> PerfReport {
        let summary = self.metrics(scope);
        let advisories = recommend_with(&summary, &self.thresholds);
        export_report(&summary, &advisories)
    }

    /// Reports for every known scope, ordered by name.
    pub fn export_all(&self) -> BTreeMap<String, PerfReport> {
        let summaries = lock(&self.registry).snapshot_all();
        summaries
            .into_iter()
            .map(|(scope, summary)| {
                let advisories = recommend_with(&summary, &self.thresholds);
                (scope, export_report(&summary, &advisories))
            })
            .collect()
    }

    /// Report for `scope` as indented JSON.
    pub fn export_metrics(&self, scope: &str) -> String {
        match self.export_report(scope).to_json_pretty() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(target: "telemetry::engine", scope, error = %e, "report serialization failed");
                "{}".to_string()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------

    /// Stop sampling and zero every counter of `scope`.
    pub fn reset(&self, scope: &str) {
        if let Some(active) = lock(&self.loops).remove(scope) {
            active.frame_loop.cancel();
        }
        lock(&self.registry).reset(scope);
    }

    /// Stop every frame loop and forget every scope.
    pub fn clear_metrics(&self) {
        let drained: Vec<ActiveLoop> = lock(&self.loops).drain().map(|(_, active)| active).collect();
        for active in drained {
            active.frame_loop.cancel();
        }
        lock(&self.registry).clear();
        tracing::debug!(target: "telemetry::engine", "metrics cleared");
    }
}

impl Default for PerfEngine {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

/// Ends a timing when dropped.
///
/// Created by [`PerfEngine::time_scope`].
#[must_use = "the timing ends when the guard is dropped"]
pub struct TimingGuard<'a> {
    engine: &'a PerfEngine,
    scope: Option<String>,
}

impl TimingGuard<'_> {
    /// End the timing now and return the elapsed milliseconds.
    pub fn finish(mut self) -> Option<f64> {
        self.scope
            .take()
            .and_then(|scope| self.engine.end_timing(&scope))
    }
}

impl Drop for TimingGuard<'_> {
    fn drop(&mut self) {
        if let Some(scope) = self.scope.take() {
            self.engine.end_timing(&scope);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
