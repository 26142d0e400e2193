//! Advisory thresholds.

use serde::{Deserialize, Serialize};

/// Thresholds the recommendation engine compares metrics against.
///
/// A metric strictly beyond its threshold produces an advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    /// Average frame rate below this is too slow.
    pub min_average_fps: f64,

    /// More dropped frames than this in a session is too many.
    pub max_dropped_frames: u64,

    /// A render (the most recent completed timing) longer than this is too slow.
    ///
    /// 16ms fits one frame at 60fps.
    pub max_render_time_ms: f64,

    /// Rendering more than this multiple of the visible items is over-rendering.
    pub max_render_ratio: f64,

    /// Memory in use above this fraction of the reserved total is too high.
    pub max_memory_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_average_fps: 50.0,
            max_dropped_frames: 10,
            max_render_time_ms: 16.0,
            max_render_ratio: 3.0,
            max_memory_ratio: 0.80,
        }
    }
}

impl Thresholds {
    /// Builder method to set the minimum frame rate.
    pub fn with_min_average_fps(mut self, fps: f64) -> Self {
        self.min_average_fps = fps;
        self
    }

    /// Builder method to set the dropped frame allowance.
    pub fn with_max_dropped_frames(mut self, frames: u64) -> Self {
        self.max_dropped_frames = frames;
        self
    }

    /// Builder method to set the render time budget.
    pub fn with_max_render_time_ms(mut self, ms: f64) -> Self {
        self.max_render_time_ms = ms;
        self
    }

    /// Builder method to set the over-rendering ratio.
    pub fn with_max_render_ratio(mut self, ratio: f64) -> Self {
        self.max_render_ratio = ratio;
        self
    }

    /// Builder method to set the memory ratio.
    pub fn with_max_memory_ratio(mut self, ratio: f64) -> Self {
        self.max_memory_ratio = ratio;
        self
    }

    /// Check if a frame rate is acceptable.
    pub fn check_fps(&self, fps: f64) -> bool {
        fps >= self.min_average_fps
    }

    /// Check if a dropped frame count is acceptable.
    pub fn check_dropped(&self, dropped: u64) -> bool {
        dropped <= self.max_dropped_frames
    }

    /// Check if a render time is acceptable.
    pub fn check_render_time(&self, ms: f64) -> bool {
        ms <= self.max_render_time_ms
    }

    /// Check if the rendered/visible ratio is acceptable.
    pub fn check_render_ratio(&self, rendered: u64, visible: u64) -> bool {
        rendered as f64 <= self.max_render_ratio * visible as f64
    }

    /// Check if a memory usage ratio is acceptable.
    pub fn check_memory_ratio(&self, ratio: f64) -> bool {
        ratio <= self.max_memory_ratio
    }
}
