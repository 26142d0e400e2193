//! Driver configuration.

use std::path::Path;

use anyhow::Context;
use monitor::MonitorConfig;
use serde::{Deserialize, Serialize};
use telemetry::Thresholds;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "PULSE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulseConfig {
    pub monitor: MonitorConfig,
    pub thresholds: Thresholds,
}

impl PulseConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.monitor.validate().context("invalid monitor config")?;
        Ok(config)
    }

    /// Load from `PULSE_CONFIG` when set, otherwise defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"monitor": {{"targetFrameMs": 8.33}}, "thresholds": {{"minAverageFps": 100}}}}"#).unwrap();

        let config = PulseConfig::from_file(file.path()).unwrap();
        assert_eq!(config.monitor.target_frame_ms, 8.33);
        assert_eq!(config.monitor.drop_factor, 2.0);
        assert_eq!(config.thresholds.min_average_fps, 100.0);
        assert_eq!(config.thresholds.max_dropped_frames, 10);
    }

    #[test]
    fn test_invalid_monitor_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"monitor": {{"dropFactor": -1.0}}}}"#).unwrap();

        let err = PulseConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid monitor config"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = PulseConfig::from_file("/nonexistent/pulse.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pulse.json"));
    }
}
