//! Registry of named measurement scopes.

use crate::clock::{Clock, MonotonicClock};
use crate::config::MonitorConfig;
use crate::frame::SamplingToken;
use crate::memory::HeapProbe;
use crate::scope::ScopeMonitor;
use crate::summary::MetricsSummary;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Heap probe used when none is supplied.
pub fn default_heap_probe() -> Arc<dyn HeapProbe> {
    #[cfg(feature = "host-memory")]
    {
        Arc::new(crate::memory::SystemHeapProbe::new())
    }
    #[cfg(not(feature = "host-memory"))]
    {
        Arc::new(crate::memory::NoHeapProbe)
    }
}

/// Owns every scope's monitor together with the clock and heap probe.
///
/// Scopes are created lazily by the first write. Reads of an unknown scope
/// return an all-zero summary and do not create it. Nothing here fails:
/// unmatched or out-of-order calls degrade to no-ops.
#[derive(Debug)]
pub struct MonitorRegistry {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    heap: Arc<dyn HeapProbe>,
    scopes: HashMap<String, ScopeMonitor>,
}

impl MonitorRegistry {
    /// Create a registry with a monotonic clock and the default heap probe.
    ///
    /// Invalid settings fall back to their defaults.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config: config.sanitized(),
            clock: Arc::new(MonotonicClock::new()),
            heap: default_heap_probe(),
            scopes: HashMap::new(),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the heap probe.
    pub fn with_heap_probe(mut self, heap: Arc<dyn HeapProbe>) -> Self {
        self.heap = heap;
        self
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Current time according to the registry clock.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    fn scope_mut(&mut self, scope: &str) -> &mut ScopeMonitor {
        let config = &self.config;
        self.scopes
            .entry(scope.to_string())
            .or_insert_with(|| ScopeMonitor::new(scope, config))
    }

    /// Begin timing `scope`, replacing any in-flight start.
    pub fn start_timing(&mut self, scope: &str) {
        let now = self.now_ms();
        self.scope_mut(scope).start_timing(now);
    }

    /// Finish timing `scope` and return the elapsed milliseconds.
    pub fn end_timing(&mut self, scope: &str) -> Option<f64> {
        let now = self.now_ms();
        self.scopes
            .get_mut(scope)
            .and_then(|monitor| monitor.end_timing(now))
            .map(|sample| sample.delta_ms)
    }

    /// Begin frame sampling for `scope`.
    ///
    /// Returns the token frame callbacks must present. When sampling is
    /// already running the existing token is returned unchanged.
    pub fn start_monitoring(&mut self, scope: &str) -> SamplingToken {
        let now = self.now_ms();
        self.scope_mut(scope).start_sampling(now)
    }

    /// Record a frame for `scope`, stamped with the registry clock.
    pub fn record_frame(&mut self, scope: &str, token: SamplingToken) -> bool {
        let now = self.now_ms();
        self.record_frame_at(scope, token, now)
    }

    /// Record a frame for `scope` with a host-supplied frame timestamp.
    pub fn record_frame_at(&mut self, scope: &str, token: SamplingToken, frame_ms: f64) -> bool {
        self.scopes
            .get_mut(scope)
            .map(|monitor| monitor.record_frame(token, frame_ms))
            .unwrap_or(false)
    }

    /// Stop frame sampling for `scope`.
    pub fn stop_monitoring(&mut self, scope: &str) -> bool {
        let now = self.now_ms();
        self.scopes
            .get_mut(scope)
            .map(|monitor| monitor.stop_sampling(now))
            .unwrap_or(false)
    }

    /// Mark sampling for `scope` unavailable.
    pub fn disable_sampling(&mut self, scope: &str) {
        if let Some(monitor) = self.scopes.get_mut(scope) {
            monitor.disable_sampling();
        }
    }

    /// Check whether `token` is the live session for `scope`.
    pub fn is_live(&self, scope: &str, token: SamplingToken) -> bool {
        self.scopes
            .get(scope)
            .map(|monitor| monitor.accepts(token))
            .unwrap_or(false)
    }

    /// Count a scroll event in `scope`.
    pub fn record_scroll_event(&mut self, scope: &str) {
        self.scope_mut(scope).record_scroll_event();
    }

    /// Replace the list state of `scope`.
    pub fn update_list_metrics(&mut self, scope: &str, total: u64, visible: u64, rendered: u64) {
        self.scope_mut(scope).update_list_metrics(total, visible, rendered);
    }

    /// Snapshot `scope`.
    ///
    /// Unknown scopes read as all zero apart from the current memory reading.
    pub fn metrics(&self, scope: &str) -> MetricsSummary {
        match self.scopes.get(scope) {
            Some(monitor) => monitor.summary(self.now_ms(), self.heap.sample()),
            None => MetricsSummary {
                memory: self.heap.sample(),
                ..MetricsSummary::empty(scope)
            },
        }
    }

    /// Snapshot every scope, keyed and ordered by name.
    pub fn snapshot_all(&self) -> BTreeMap<String, MetricsSummary> {
        let now = self.now_ms();
        let memory = self.heap.sample();
        self.scopes
            .iter()
            .map(|(name, monitor)| (name.clone(), monitor.summary(now, memory)))
            .collect()
    }

    /// Check whether `scope` has been written to.
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains_key(scope)
    }

    /// Names of all known scopes, sorted.
    pub fn scopes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scopes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Zero `scope`, stopping any sampling and dropping pending timings.
    pub fn reset(&mut self, scope: &str) {
        if let Some(monitor) = self.scopes.get_mut(scope) {
            monitor.reset();
        }
    }

    /// Forget every scope.
    pub fn clear(&mut self) {
        for monitor in self.scopes.values_mut() {
            monitor.reset();
        }
        self.scopes.clear();
        tracing::debug!(target: "monitor::registry", "all scopes cleared");
    }
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::frame::SessionState;
    use crate::memory::{FixedHeapProbe, MemoryUsage, NoHeapProbe};

    fn registry() -> (MonitorRegistry, ManualClock) {
        let clock = ManualClock::new();
        let registry = MonitorRegistry::new(MonitorConfig::default())
            .with_clock(Arc::new(clock.clone()))
            .with_heap_probe(Arc::new(NoHeapProbe));
        (registry, clock)
    }

    #[test]
    fn test_timing_measures_simulated_clock() {
        let (mut registry, clock) = registry();
        registry.start_timing("home");
        clock.advance_ms(120.0);

        assert_eq!(registry.end_timing("home"), Some(120.0));
        assert_eq!(registry.metrics("home").render_time_ms, 120.0);
    }

    #[test]
    fn test_end_timing_unknown_scope() {
        let (mut registry, _clock) = registry();

        assert_eq!(registry.end_timing("ghost"), None);
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_metrics_unknown_scope_is_zero() {
        let (registry, _clock) = registry();
        assert_eq!(registry.metrics("ghost"), MetricsSummary::empty("ghost"));
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_frames_stamped_by_clock() {
        let (mut registry, clock) = registry();
        let token = registry.start_monitoring("feed");

        for _ in 0..10 {
            clock.advance_ms(16.0);
            assert!(registry.record_frame("feed", token));
        }
        clock.advance_ms(40.0);
        registry.record_frame("feed", token);
        registry.stop_monitoring("feed");

        let summary = registry.metrics("feed");
        assert_eq!(summary.sample_count, 11);
        assert_eq!(summary.dropped_count, 1);
        assert_eq!(summary.min_delta_ms, 16.0);
        assert_eq!(summary.max_delta_ms, 40.0);
        assert_eq!(summary.state, SessionState::Stopped);
        assert_eq!(summary.monitoring_duration_ms, 200.0);
        assert!((summary.average_fps - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_scopes_are_independent() {
        let (mut registry, _clock) = registry();
        registry.record_scroll_event("a");
        registry.update_list_metrics("b", 10, 2, 4);

        assert_eq!(registry.metrics("a").scroll_events, 1);
        assert!(registry.metrics("a").list_metrics.is_none());
        assert_eq!(registry.metrics("b").scroll_events, 0);
        assert_eq!(registry.scopes(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_reset_then_metrics_all_zero() {
        let (mut registry, clock) = registry();
        let token = registry.start_monitoring("feed");
        clock.advance_ms(50.0);
        registry.record_frame("feed", token);
        registry.update_list_metrics("feed", 100, 20, 35);
        registry.reset("feed");

        let summary = registry.metrics("feed");
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.dropped_count, 0);
        assert!(summary.list_metrics.is_none());
        assert!(!registry.is_live("feed", token));
    }

    #[test]
    fn test_clear_forgets_scopes() {
        let (mut registry, _clock) = registry();
        registry.start_monitoring("a");
        registry.start_timing("b");
        registry.clear();

        assert!(registry.scopes().is_empty());
    }

    #[test]
    fn test_memory_from_probe() {
        let registry = MonitorRegistry::default()
            .with_clock(Arc::new(ManualClock::new()))
            .with_heap_probe(Arc::new(FixedHeapProbe(MemoryUsage::new(50, 100))));
        let mut registry = registry;
        registry.record_scroll_event("feed");

        let summary = registry.metrics("feed");
        assert_eq!(summary.memory, Some(MemoryUsage::new(50, 100)));
    }

    #[test]
    fn test_unknown_scope_still_reports_memory() {
        let registry = MonitorRegistry::default()
            .with_clock(Arc::new(ManualClock::new()))
            .with_heap_probe(Arc::new(FixedHeapProbe(MemoryUsage::new(50, 100))));

        let summary = registry.metrics("ghost");
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.memory, Some(MemoryUsage::new(50, 100)));
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = MonitorConfig::default()
            .with_drop_factor(0.0)
            .with_frame_interval_ms(-5.0);
        let registry = MonitorRegistry::new(config);

        assert_eq!(registry.config(), &MonitorConfig::default());
    }

    #[test]
    fn test_snapshot_all_ordered() {
        let (mut registry, _clock) = registry();
        registry.record_scroll_event("zeta");
        registry.record_scroll_event("alpha");

        let all = registry.snapshot_all();
        let keys: Vec<_> = all.keys().cloned().collect();
        assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_record_frame_unknown_scope() {
        let (mut registry, _clock) = registry();
        let token = registry.start_monitoring("a");

        assert!(!registry.record_frame("b", token));
    }
}
