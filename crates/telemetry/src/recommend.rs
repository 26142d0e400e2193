//! Advisory recommendations derived from aggregated metrics.

use crate::thresholds::Thresholds;
use monitor::MetricsSummary;
use std::fmt;

/// One piece of advice about a scope's performance.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Average frame rate is below target
    LowFps {
        /// Measured frames per second
        average_fps: f64,
        /// Minimum acceptable frames per second
        min_fps: f64,
    },
    /// Too many frames exceeded the drop threshold
    FrequentFrameDrops {
        /// Dropped frames in the session
        dropped: u64,
        /// Allowed dropped frames
        allowed: u64,
    },
    /// The last render took longer than one frame
    SlowRender {
        /// Measured render time
        render_time_ms: f64,
        /// Render time budget
        budget_ms: f64,
    },
    /// Far more list items are mounted than visible
    OverRendering {
        /// Mounted items
        rendered: u64,
        /// Visible items
        visible: u64,
        /// Allowed rendered/visible ratio
        max_ratio: f64,
    },
    /// Memory in use is close to the reserved total
    HighMemoryUsage {
        /// used / total
        ratio: f64,
        /// Allowed ratio
        max_ratio: f64,
    },
    /// Nothing crossed a threshold
    Healthy,
}

impl Advisory {
    /// Human-readable advice.
    pub fn message(&self) -> String {
        match self {
            Advisory::LowFps {
                average_fps,
                min_fps,
            } => format!(
                "Low frame rate: averaging {:.1} fps (target {:.0} fps). Reduce work done on each frame.",
                average_fps, min_fps
            ),
            Advisory::FrequentFrameDrops { dropped, allowed } => format!(
                "Frequent frame drops: {} frames dropped (allowed {}). Move heavy work off the frame path.",
                dropped, allowed
            ),
            Advisory::SlowRender {
                render_time_ms,
                budget_ms,
            } => format!(
                "Render time too long: {:.1}ms (budget {:.0}ms). Pre-compute item layout so rows skip measurement.",
                render_time_ms, budget_ms
            ),
            Advisory::OverRendering {
                rendered,
                visible,
                max_ratio,
            } => format!(
                "Over-rendering: {} items rendered for {} visible (more than {:.0}x). Tune batch size and window size.",
                rendered, visible, max_ratio
            ),
            Advisory::HighMemoryUsage { ratio, max_ratio } => format!(
                "High memory usage: {:.0}% in use (limit {:.0}%). Release offscreen images and cached rows.",
                ratio * 100.0,
                max_ratio * 100.0
            ),
            Advisory::Healthy => {
                "Performance is good: all metrics are performing well within thresholds.".to_string()
            }
        }
    }

    /// Check if this is the all-clear advisory.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Advisory::Healthy)
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Evaluate `summary` against the default thresholds.
pub fn recommend(summary: &MetricsSummary) -> Vec<Advisory> {
    recommend_with(summary, &Thresholds::default())
}

/// Evaluate `summary` against `thresholds`.
///
/// Every matching condition is reported, in table order: frame rate, dropped
/// frames, render time, over-rendering, memory. When nothing matches the
/// result is a single [`Advisory::Healthy`]. The frame rate check only runs
/// once frames have been sampled, the list check needs list metrics, and the
/// memory check needs a memory reading with a non-zero total.
pub fn recommend_with(summary: &MetricsSummary, thresholds: &Thresholds) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if summary.has_frames() && !thresholds.check_fps(summary.average_fps) {
        advisories.push(Advisory::LowFps {
            average_fps: summary.average_fps,
            min_fps: thresholds.min_average_fps,
        });
    }

    if !thresholds.check_dropped(summary.dropped_count) {
        advisories.push(Advisory::FrequentFrameDrops {
            dropped: summary.dropped_count,
            allowed: thresholds.max_dropped_frames,
        });
    }

    if !thresholds.check_render_time(summary.render_time_ms) {
        advisories.push(Advisory::SlowRender {
            render_time_ms: summary.render_time_ms,
            budget_ms: thresholds.max_render_time_ms,
        });
    }

    if let Some(list) = &summary.list_metrics {
        if !thresholds.check_render_ratio(list.rendered_items, list.visible_items) {
            advisories.push(Advisory::OverRendering {
                rendered: list.rendered_items,
                visible: list.visible_items,
                max_ratio: thresholds.max_render_ratio,
            });
        }
    }

    if let Some(ratio) = summary.memory.as_ref().and_then(|m| m.usage_ratio()) {
        if !thresholds.check_memory_ratio(ratio) {
            advisories.push(Advisory::HighMemoryUsage {
                ratio,
                max_ratio: thresholds.max_memory_ratio,
            });
        }
    }

    if advisories.is_empty() {
        advisories.push(Advisory::Healthy);
    }

    tracing::trace!(
        target: "telemetry::recommend",
        scope = %summary.scope,
        count = advisories.len(),
        "recommendations computed"
    );

    advisories
}

/// Advisory messages for `summary` against the default thresholds.
pub fn recommendation_messages(summary: &MetricsSummary) -> Vec<String> {
    recommend(summary).iter().map(Advisory::message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor::{ListMetrics, MemoryUsage};

    fn healthy() -> MetricsSummary {
        MetricsSummary {
            sample_count: 120,
            average_fps: 60.0,
            dropped_count: 2,
            render_time_ms: 8.0,
            list_metrics: Some(ListMetrics::new(100, 20, 40)),
            memory: Some(MemoryUsage::new(40, 100)),
            ..MetricsSummary::empty("feed")
        }
    }

    #[test]
    fn test_healthy_returns_single_message() {
        let advisories = recommend(&healthy());
        assert_eq!(advisories, vec![Advisory::Healthy]);
        assert!(advisories[0].message().contains("performing well"));
    }

    #[test]
    fn test_four_warnings_in_table_order() {
        let summary = MetricsSummary {
            average_fps: 40.0,
            dropped_count: 15,
            render_time_ms: 20.0,
            list_metrics: Some(ListMetrics::new(500, 20, 100)),
            memory: None,
            ..healthy()
        };

        let advisories = recommend(&summary);
        assert_eq!(advisories.len(), 4);
        assert!(matches!(advisories[0], Advisory::LowFps { .. }));
        assert!(matches!(advisories[1], Advisory::FrequentFrameDrops { dropped: 15, .. }));
        assert!(matches!(advisories[2], Advisory::SlowRender { .. }));
        assert!(matches!(
            advisories[3],
            Advisory::OverRendering {
                rendered: 100,
                visible: 20,
                ..
            }
        ));
    }

    #[test]
    fn test_all_five_warnings() {
        let summary = MetricsSummary {
            average_fps: 30.0,
            dropped_count: 50,
            render_time_ms: 40.0,
            list_metrics: Some(ListMetrics::new(500, 10, 200)),
            memory: Some(MemoryUsage::new(90, 100)),
            ..healthy()
        };

        let advisories = recommend(&summary);
        assert_eq!(advisories.len(), 5);
        assert!(matches!(advisories[4], Advisory::HighMemoryUsage { .. }));
        assert!(!advisories.iter().any(Advisory::is_healthy));
    }

    #[test]
    fn test_no_frames_skips_fps_check() {
        let summary = MetricsSummary::empty("idle");
        assert_eq!(recommend(&summary), vec![Advisory::Healthy]);
    }

    #[test]
    fn test_memory_without_total_is_ignored() {
        let summary = MetricsSummary {
            memory: Some(MemoryUsage::new(90, 0)),
            ..healthy()
        };
        assert_eq!(recommend(&summary), vec![Advisory::Healthy]);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = Thresholds::default().with_max_render_time_ms(4.0);
        let advisories = recommend_with(&healthy(), &thresholds);

        assert_eq!(advisories.len(), 1);
        assert!(matches!(advisories[0], Advisory::SlowRender { .. }));
    }

    #[test]
    fn test_messages_match_advisories() {
        let summary = MetricsSummary {
            dropped_count: 11,
            ..healthy()
        };
        let messages = recommendation_messages(&summary);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("11 frames dropped"));
    }

    #[test]
    fn test_display_uses_message() {
        let advisory = Advisory::HighMemoryUsage {
            ratio: 0.9,
            max_ratio: 0.8,
        };
        assert_eq!(advisory.to_string(), advisory.message());
        assert!(advisory.message().contains("90%"));
    }
}
