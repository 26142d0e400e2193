//! Immutable metric snapshots.

use crate::frame::SessionState;
use crate::memory::MemoryUsage;
use crate::stats::TimingStats;
use serde::{Deserialize, Serialize};

/// Virtualized list state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetrics {
    /// Items in the backing data set
    pub total_items: u64,
    /// Items inside the viewport
    pub visible_items: u64,
    /// Items currently mounted
    pub rendered_items: u64,
    /// Mounted items outside the viewport, eligible for reuse
    pub recycled_items: u64,
}

impl ListMetrics {
    /// Build list metrics, deriving the recycled count.
    pub fn new(total_items: u64, visible_items: u64, rendered_items: u64) -> Self {
        Self {
            total_items,
            visible_items,
            rendered_items,
            recycled_items: rendered_items.saturating_sub(visible_items),
        }
    }
}

/// Aggregated metrics for one scope.
///
/// Frame statistics satisfy `min <= average <= max` when `sample_count > 0`
/// and are all zero otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    /// Scope these metrics belong to
    pub scope: String,
    /// Sampling session state
    pub state: SessionState,
    /// Number of frame intervals sampled
    pub sample_count: u64,
    /// Mean frame interval in milliseconds
    pub average_delta_ms: f64,
    /// Number of intervals above the drop threshold
    pub dropped_count: u64,
    /// Shortest frame interval in milliseconds
    pub min_delta_ms: f64,
    /// Longest frame interval in milliseconds
    pub max_delta_ms: f64,
    /// Frames per second over the session
    pub average_fps: f64,
    /// Session length in milliseconds
    pub monitoring_duration_ms: f64,
    /// Externally reported scroll events
    pub scroll_events: u64,
    /// Most recent completed timing in milliseconds
    pub render_time_ms: f64,
    /// Statistics over all completed timings
    pub timings: TimingStats,
    /// Present once list metrics have been reported
    pub list_metrics: Option<ListMetrics>,
    /// `None` when the host cannot report memory
    pub memory: Option<MemoryUsage>,
}

impl MetricsSummary {
    /// An all-zero summary for a scope with no data.
    pub fn empty(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            state: SessionState::Idle,
            sample_count: 0,
            average_delta_ms: 0.0,
            dropped_count: 0,
            min_delta_ms: 0.0,
            max_delta_ms: 0.0,
            average_fps: 0.0,
            monitoring_duration_ms: 0.0,
            scroll_events: 0,
            render_time_ms: 0.0,
            timings: TimingStats::default(),
            list_metrics: None,
            memory: None,
        }
    }

    /// Check if any frames were sampled.
    #[inline]
    pub fn has_frames(&self) -> bool {
        self.sample_count > 0
    }

    /// Fraction of sampled frames that were dropped.
    pub fn drop_rate(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.dropped_count as f64 / self.sample_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recycled_items_derived() {
        let list = ListMetrics::new(100, 20, 35);
        assert_eq!(list.recycled_items, 15);
    }

    #[test]
    fn test_recycled_items_never_negative() {
        let list = ListMetrics::new(100, 20, 10);
        assert_eq!(list.recycled_items, 0);
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let summary = MetricsSummary::empty("home");

        assert_eq!(summary.scope, "home");
        assert_eq!(summary.state, SessionState::Idle);
        assert!(!summary.has_frames());
        assert_eq!(summary.drop_rate(), 0.0);
        assert!(summary.list_metrics.is_none());
        assert!(summary.memory.is_none());
    }

    #[test]
    fn test_drop_rate() {
        let summary = MetricsSummary {
            sample_count: 40,
            dropped_count: 10,
            ..MetricsSummary::empty("feed")
        };
        assert_eq!(summary.drop_rate(), 0.25);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = MetricsSummary::empty("feed");
        let json = serde_json::to_value(&summary).unwrap();

        assert!(json.get("sampleCount").is_some());
        assert!(json.get("averageDeltaMs").is_some());
        assert_eq!(json["state"], "idle");
        assert!(json["memory"].is_null());
    }
}
