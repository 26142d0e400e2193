//! Per-scope metrics aggregation.

use crate::config::MonitorConfig;
use crate::frame::{FrameSampler, SamplingToken, SessionState};
use crate::memory::MemoryUsage;
use crate::summary::{ListMetrics, MetricsSummary};
use crate::timing::{Sample, TimingRecorder};

/// Combines timing, frame sampling and list state for one named scope.
///
/// Every method takes the current time explicitly; the registry owns the
/// clock.
#[derive(Debug, Clone)]
pub struct ScopeMonitor {
    name: String,
    timing: TimingRecorder,
    frames: FrameSampler,
    list: Option<ListMetrics>,
}

impl ScopeMonitor {
    /// Create an idle monitor.
    pub fn new(name: impl Into<String>, config: &MonitorConfig) -> Self {
        Self {
            name: name.into(),
            timing: TimingRecorder::new(),
            frames: FrameSampler::new(config.drop_threshold_ms()),
            list: None,
        }
    }

    /// Scope name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Begin timing an operation in this scope.
    pub fn start_timing(&mut self, now_ms: f64) {
        if self.timing.start(now_ms) {
            tracing::debug!(
                target: "monitor::timing",
                scope = %self.name,
                "timing restarted before end; previous start discarded"
            );
        }
    }

    /// Finish the in-flight timing, if any.
    pub fn end_timing(&mut self, now_ms: f64) -> Option<Sample> {
        let sample = self.timing.end(now_ms);
        match sample {
            Some(sample) => tracing::trace!(
                target: "monitor::timing",
                scope = %self.name,
                elapsed_ms = sample.delta_ms,
                "timing recorded"
            ),
            None => tracing::debug!(
                target: "monitor::timing",
                scope = %self.name,
                "end without matching start ignored"
            ),
        }
        sample
    }

    /// Begin frame sampling; a no-op returning the live token when already running.
    pub fn start_sampling(&mut self, now_ms: f64) -> SamplingToken {
        let was_running = self.frames.state() == SessionState::Running;
        let token = self.frames.start(now_ms);
        if !was_running {
            tracing::debug!(
                target: "monitor::frame",
                scope = %self.name,
                generation = token.generation(),
                "sampling started"
            );
        }
        token
    }

    /// Record a frame for the session identified by `token`.
    pub fn record_frame(&mut self, token: SamplingToken, frame_ms: f64) -> bool {
        match self.frames.record_frame(token, frame_ms) {
            Some(sample) => {
                tracing::trace!(
                    target: "monitor::frame",
                    scope = %self.name,
                    delta_ms = sample.delta_ms,
                    "frame sampled"
                );
                true
            }
            None => {
                tracing::trace!(
                    target: "monitor::frame",
                    scope = %self.name,
                    generation = token.generation(),
                    "stale frame discarded"
                );
                false
            }
        }
    }

    /// Stop frame sampling.
    pub fn stop_sampling(&mut self, now_ms: f64) -> bool {
        let stopped = self.frames.stop(now_ms);
        if stopped {
            tracing::debug!(
                target: "monitor::frame",
                scope = %self.name,
                frames = self.frames.intervals().count(),
                dropped = self.frames.dropped_count(),
                fps = self.frames.average_fps(now_ms),
                "sampling stopped"
            );
        }
        stopped
    }

    /// Fall back to a zeroed sampler because no frame source is available.
    pub fn disable_sampling(&mut self) {
        tracing::warn!(
            target: "monitor::frame",
            scope = %self.name,
            "no frame scheduler available; frame metrics disabled"
        );
        self.frames.disable();
    }

    /// Count a scroll event.
    pub fn record_scroll_event(&mut self) {
        self.frames.record_scroll_event();
    }

    /// Replace the list state.
    pub fn update_list_metrics(&mut self, total: u64, visible: u64, rendered: u64) {
        self.list = Some(ListMetrics::new(total, visible, rendered));
    }

    /// Current sampling state.
    #[inline]
    pub fn sampling_state(&self) -> SessionState {
        self.frames.state()
    }

    /// Check whether `token` belongs to the running session.
    #[inline]
    pub fn accepts(&self, token: SamplingToken) -> bool {
        self.frames.accepts(token)
    }

    /// Snapshot the scope at `now_ms`. Reading never resets anything.
    pub fn summary(&self, now_ms: f64, memory: Option<MemoryUsage>) -> MetricsSummary {
        let intervals = self.frames.intervals();
        MetricsSummary {
            scope: self.name.clone(),
            state: self.frames.state(),
            sample_count: intervals.count(),
            average_delta_ms: intervals.mean(),
            dropped_count: self.frames.dropped_count(),
            min_delta_ms: intervals.min(),
            max_delta_ms: intervals.max(),
            average_fps: self.frames.average_fps(now_ms),
            monitoring_duration_ms: self.frames.duration_ms(now_ms),
            scroll_events: self.frames.scroll_events(),
            render_time_ms: self.timing.last_ms(),
            timings: self.timing.stats(),
            list_metrics: self.list,
            memory,
        }
    }

    /// Stop sampling, zero every counter and forget pending timings.
    pub fn reset(&mut self) {
        self.timing.reset();
        self.frames.reset();
        self.list = None;
        tracing::debug!(target: "monitor::scope", scope = %self.name, "scope reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> ScopeMonitor {
        ScopeMonitor::new("feed", &MonitorConfig::default())
    }

    #[test]
    fn test_summary_combines_sources() {
        let mut scope = monitor();
        scope.start_timing(0.0);
        scope.end_timing(12.0);

        let token = scope.start_sampling(0.0);
        scope.record_frame(token, 16.0);
        scope.record_frame(token, 56.0);
        scope.record_scroll_event();
        scope.update_list_metrics(100, 20, 35);

        let summary = scope.summary(100.0, Some(MemoryUsage::new(1, 2)));
        assert_eq!(summary.scope, "feed");
        assert_eq!(summary.render_time_ms, 12.0);
        assert_eq!(summary.timings.count, 1);
        assert_eq!(summary.sample_count, 2);
        assert_eq!(summary.dropped_count, 1);
        assert_eq!(summary.average_delta_ms, 28.0);
        assert_eq!(summary.scroll_events, 1);
        assert_eq!(summary.list_metrics.unwrap().recycled_items, 15);
        assert_eq!(summary.memory, Some(MemoryUsage::new(1, 2)));
        assert_eq!(summary.state, SessionState::Running);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut scope = monitor();
        let token = scope.start_sampling(0.0);
        scope.record_frame(token, 16.0);

        let first = scope.summary(20.0, None);
        let second = scope.summary(20.0, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut scope = monitor();
        let token = scope.start_sampling(0.0);
        scope.record_frame(token, 50.0);
        scope.start_timing(0.0);
        scope.update_list_metrics(10, 5, 7);
        scope.reset();

        let summary = scope.summary(100.0, None);
        assert_eq!(summary, MetricsSummary::empty("feed"));
        assert!(!scope.accepts(token));
        assert!(scope.end_timing(200.0).is_none());
    }

    #[test]
    fn test_end_timing_without_start_leaves_counts() {
        let mut scope = monitor();
        assert!(scope.end_timing(10.0).is_none());

        let summary = scope.summary(10.0, None);
        assert_eq!(summary.timings.count, 0);
        assert_eq!(summary.sample_count, 0);
    }

    #[test]
    fn test_disable_sampling() {
        let mut scope = monitor();
        let token = scope.start_sampling(0.0);
        scope.disable_sampling();

        assert!(!scope.record_frame(token, 16.0));
        assert_eq!(scope.sampling_state(), SessionState::Idle);
    }
}
