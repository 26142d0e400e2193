//! Report export.
//!
//! Renders a [`MetricsSummary`] and its recommendations into a serializable
//! record. Field order is fixed by the struct declarations, so two reports
//! with equal contents serialize to identical JSON and diff cleanly in logs.
//!
//! # Example
//!
//! ```rust
//! use monitor::MetricsSummary;
//! use telemetry::{export_report, recommend, PerfReport};
//!
//! let summary = MetricsSummary::empty("home");
//! let report = export_report(&summary, &recommend(&summary));
//!
//! let json = report.to_json().unwrap();
//! let parsed = PerfReport::from_json(&json).unwrap();
//! assert_eq!(parsed.metrics, report.metrics);
//! ```

use chrono::{DateTime, Utc};
use monitor::{ListMetrics, MemoryUsage, MetricsSummary, SessionState, TimingStats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ReportResult;
use crate::recommend::Advisory;

/// Frame sampling figures as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPerformance {
    /// Frames per second over the session
    pub average_fps: f64,
    /// Frames above the drop threshold
    pub frame_drops: u64,
    /// Externally reported scroll events
    pub scroll_events: u64,
    /// Frame intervals sampled
    pub sample_count: u64,
    /// Mean frame interval in milliseconds
    pub average_frame_ms: f64,
    /// Shortest frame interval in milliseconds
    pub min_frame_ms: f64,
    /// Longest frame interval in milliseconds
    pub max_frame_ms: f64,
    /// Session length in milliseconds
    pub monitoring_duration_ms: f64,
}

/// The `metrics` section of a report.
///
/// The first four keys are the stable export contract; `timings`, `scope`
/// and `state` follow them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    /// Most recent completed timing in milliseconds
    pub render_time: f64,
    /// Frame sampling figures
    pub scroll_performance: ScrollPerformance,
    /// `null` when the host cannot report memory
    pub memory_usage: Option<MemoryUsage>,
    /// `null` until list metrics are reported
    pub list_metrics: Option<ListMetrics>,
    /// Statistics over all completed timings
    pub timings: TimingStats,
    /// Scope the metrics belong to
    pub scope: String,
    /// Sampling session state at capture time
    pub state: SessionState,
}

impl From<&MetricsSummary> for ReportMetrics {
    fn from(summary: &MetricsSummary) -> Self {
        Self {
            render_time: summary.render_time_ms,
            scroll_performance: ScrollPerformance {
                average_fps: summary.average_fps,
                frame_drops: summary.dropped_count,
                scroll_events: summary.scroll_events,
                sample_count: summary.sample_count,
                average_frame_ms: summary.average_delta_ms,
                min_frame_ms: summary.min_delta_ms,
                max_frame_ms: summary.max_delta_ms,
                monitoring_duration_ms: summary.monitoring_duration_ms,
            },
            memory_usage: summary.memory,
            list_metrics: summary.list_metrics,
            timings: summary.timings,
            scope: summary.scope.clone(),
            state: summary.state,
        }
    }
}

impl From<&ReportMetrics> for MetricsSummary {
    fn from(metrics: &ReportMetrics) -> Self {
        let scroll = &metrics.scroll_performance;
        Self {
            scope: metrics.scope.clone(),
            state: metrics.state,
            sample_count: scroll.sample_count,
            average_delta_ms: scroll.average_frame_ms,
            dropped_count: scroll.frame_drops,
            min_delta_ms: scroll.min_frame_ms,
            max_delta_ms: scroll.max_frame_ms,
            average_fps: scroll.average_fps,
            monitoring_duration_ms: scroll.monitoring_duration_ms,
            scroll_events: scroll.scroll_events,
            render_time_ms: metrics.render_time,
            timings: metrics.timings,
            list_metrics: metrics.list_metrics,
            memory: metrics.memory_usage,
        }
    }
}

/// An exported performance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfReport {
    /// Capture time, serialized as ISO-8601
    pub timestamp: DateTime<Utc>,
    /// Aggregated metrics
    pub metrics: ReportMetrics,
    /// Advisory messages in threshold-table order
    pub recommendations: Vec<String>,
}

impl PerfReport {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report previously produced by [`PerfReport::to_json`].
    pub fn from_json(json: &str) -> ReportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the report as indented JSON.
    pub fn write_to(&self, path: impl AsRef<Path>) -> ReportResult<PathBuf> {
        let json = self.to_json_pretty()?;
        let path = path.as_ref().to_path_buf();
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Rebuild the summary this report was exported from.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::from(&self.metrics)
    }
}

/// Build a report captured now.
pub fn export_report(summary: &MetricsSummary, advisories: &[Advisory]) -> PerfReport {
    export_report_at(summary, advisories, Utc::now())
}

/// Build a report with an explicit capture time.
pub fn export_report_at(
    summary: &MetricsSummary,
    advisories: &[Advisory],
    timestamp: DateTime<Utc>,
) -> PerfReport {
    PerfReport {
        timestamp,
        metrics: ReportMetrics::from(summary),
        recommendations: advisories.iter().map(Advisory::message).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::recommend;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn busy_summary() -> MetricsSummary {
        MetricsSummary {
            state: SessionState::Stopped,
            sample_count: 80,
            average_delta_ms: 20.5,
            dropped_count: 12,
            min_delta_ms: 16.0,
            max_delta_ms: 48.0,
            average_fps: 45.0,
            monitoring_duration_ms: 2000.0,
            scroll_events: 7,
            render_time_ms: 18.25,
            timings: TimingStats {
                count: 2,
                average_ms: 14.0,
                min_ms: 9.75,
                max_ms: 18.25,
                total_ms: 28.0,
            },
            list_metrics: Some(ListMetrics::new(100, 20, 35)),
            memory: Some(MemoryUsage::new(512, 1024)),
            ..MetricsSummary::empty("feed")
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_report_top_level_keys_in_order() {
        let summary = busy_summary();
        let report = export_report_at(&summary, &recommend(&summary), fixed_time());
        let json = report.to_json().unwrap();

        let ts = json.find("\"timestamp\"").unwrap();
        let metrics = json.find("\"metrics\"").unwrap();
        let recs = json.find("\"recommendations\"").unwrap();
        assert!(ts < metrics && metrics < recs);
        assert!(json.starts_with("{\"timestamp\":\"2024-05-01T12:30:00Z\""));
    }

    #[test]
    fn test_metrics_section_shape() {
        let summary = busy_summary();
        let report = export_report_at(&summary, &[], fixed_time());
        let value = serde_json::to_value(&report).unwrap();
        let metrics = &value["metrics"];

        assert_eq!(metrics["renderTime"], 18.25);
        assert_eq!(metrics["scrollPerformance"]["frameDrops"], 12);
        assert_eq!(metrics["scrollPerformance"]["averageFps"], 45.0);
        assert_eq!(metrics["memoryUsage"]["usedBytes"], 512);
        assert_eq!(metrics["listMetrics"]["recycledItems"], 15);
        assert_eq!(metrics["scope"], "feed");
    }

    #[test]
    fn test_unavailable_memory_is_null() {
        let summary = MetricsSummary::empty("home");
        let report = export_report_at(&summary, &[Advisory::Healthy], fixed_time());
        let value = serde_json::to_value(&report).unwrap();

        assert!(value["metrics"]["memoryUsage"].is_null());
        assert!(value["metrics"]["listMetrics"].is_null());
    }

    #[test]
    fn test_round_trip_preserves_metrics_and_recommendations() {
        let summary = busy_summary();
        let report = export_report(&summary, &recommend(&summary));

        let parsed = PerfReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed.metrics, report.metrics);
        assert_eq!(parsed.recommendations, report.recommendations);
        assert_eq!(parsed.summary(), summary);
    }

    #[test]
    fn test_serialization_is_reproducible() {
        let summary = busy_summary();
        let advisories = recommend(&summary);
        let a = export_report_at(&summary, &advisories, fixed_time());
        let b = export_report_at(&summary, &advisories, fixed_time());

        assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
    }

    #[test]
    fn test_recommendations_are_messages() {
        let summary = busy_summary();
        let advisories = recommend(&summary);
        let report = export_report_at(&summary, &advisories, fixed_time());

        assert_eq!(report.recommendations.len(), advisories.len());
        assert_eq!(report.recommendations[0], advisories[0].message());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let summary = busy_summary();
        let report = export_report_at(&summary, &[], fixed_time());

        let path = report.write_to(dir.path().join("report.json")).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(PerfReport::from_json(&contents).unwrap(), report);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(PerfReport::from_json("{\"timestamp\": 3}").is_err());
    }

    proptest! {
        #[test]
        fn prop_json_preserves_float_metrics(
            fps in 0.0f64..240.0,
            frame in prop::collection::vec(0.0f64..1000.0, 3),
            duration in 0.0f64..3_600_000.0,
            render in 0.0f64..1000.0,
            timing in prop::collection::vec(0.0f64..1000.0, 3),
        ) {
            let summary = MetricsSummary {
                sample_count: 3,
                average_fps: fps,
                average_delta_ms: frame[0],
                min_delta_ms: frame[1],
                max_delta_ms: frame[2],
                monitoring_duration_ms: duration,
                render_time_ms: render,
                timings: TimingStats {
                    count: 3,
                    average_ms: timing[0],
                    min_ms: timing[1],
                    max_ms: timing[2],
                    total_ms: timing[0] * 3.0,
                },
                ..MetricsSummary::empty("feed")
            };
            let report = export_report_at(&summary, &recommend(&summary), fixed_time());

            let parsed = PerfReport::from_json(&report.to_json().unwrap()).unwrap();
            prop_assert_eq!(&parsed.metrics, &report.metrics);
            prop_assert_eq!(parsed.summary(), summary);
        }
    }
}
