//! Sampling configuration.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-frame budget for a 60fps target, in milliseconds.
pub const TARGET_FRAME_MS_60FPS: f64 = 16.67;

/// Multiple of the frame budget beyond which an interval counts as dropped.
pub const DEFAULT_DROP_FACTOR: f64 = 2.0;

/// Shortest frame callback period a timer is asked for.
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_nanos(1);

/// Frame sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Target time per frame in milliseconds.
    ///
    /// 16.67ms for 60fps, 8.33ms for 120fps.
    pub target_frame_ms: f64,

    /// An interval longer than `drop_factor * target_frame_ms` is a dropped frame.
    pub drop_factor: f64,

    /// Period of the frame callback when the host drives sampling from a timer.
    pub frame_interval_ms: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::for_60fps()
    }
}

impl MonitorConfig {
    /// Configuration for a 60fps display.
    pub fn for_60fps() -> Self {
        Self {
            target_frame_ms: TARGET_FRAME_MS_60FPS,
            drop_factor: DEFAULT_DROP_FACTOR,
            frame_interval_ms: TARGET_FRAME_MS_60FPS,
        }
    }

    /// Configuration for a 120fps display.
    pub fn for_120fps() -> Self {
        Self {
            target_frame_ms: 8.33,
            drop_factor: DEFAULT_DROP_FACTOR,
            frame_interval_ms: 8.33,
        }
    }

    /// Builder method to set the frame budget.
    pub fn with_target_frame_ms(mut self, ms: f64) -> Self {
        self.target_frame_ms = ms;
        self
    }

    /// Builder method to set the drop factor.
    pub fn with_drop_factor(mut self, factor: f64) -> Self {
        self.drop_factor = factor;
        self
    }

    /// Builder method to set the frame callback period.
    pub fn with_frame_interval_ms(mut self, ms: f64) -> Self {
        self.frame_interval_ms = ms;
        self
    }

    /// Interval above which a frame counts as dropped.
    #[inline]
    pub fn drop_threshold_ms(&self) -> f64 {
        self.target_frame_ms * self.drop_factor
    }

    /// Frame callback period as a `Duration`, never shorter than [`MIN_FRAME_INTERVAL`].
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.frame_interval_ms / 1000.0)
            .unwrap_or(MIN_FRAME_INTERVAL)
            .max(MIN_FRAME_INTERVAL)
    }

    /// Replace every invalid setting with its 60fps default.
    ///
    /// Each replaced field is logged at `warn`.
    pub fn sanitized(self) -> Self {
        let defaults = Self::for_60fps();
        let keep = |field: &'static str, value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                tracing::warn!(
                    target: "monitor::config",
                    field,
                    value,
                    fallback,
                    "invalid setting replaced with default"
                );
                fallback
            }
        };

        Self {
            target_frame_ms: keep("targetFrameMs", self.target_frame_ms, defaults.target_frame_ms),
            drop_factor: keep("dropFactor", self.drop_factor, defaults.drop_factor),
            frame_interval_ms: keep(
                "frameIntervalMs",
                self.frame_interval_ms,
                defaults.frame_interval_ms,
            ),
        }
    }

    /// Check that every setting is finite and positive.
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("targetFrameMs", self.target_frame_ms),
            ("dropFactor", self.drop_factor),
            ("frameIntervalMs", self.frame_interval_ms),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
