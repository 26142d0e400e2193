//! Performance Measurement Core
//!
//! This crate provides the measurement and aggregation layer of the
//! performance telemetry engine:
//! - Clock sources, including a manually driven clock for tests
//! - Start/stop timing pairs per named scope
//! - Frame interval sampling with dropped-frame detection
//! - Per-scope aggregation into bounded-memory summaries
//! - Best-effort memory readings through pluggable heap probes
//!
//! # Feature Flags
//!
//! - `host-memory` (default): Read system memory usage through `sysinfo`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use monitor::{ManualClock, MonitorConfig, MonitorRegistry, NoHeapProbe};
//!
//! let clock = ManualClock::new();
//! let mut registry = MonitorRegistry::new(MonitorConfig::default())
//!     .with_clock(Arc::new(clock.clone()))
//!     .with_heap_probe(Arc::new(NoHeapProbe));
//!
//! registry.start_timing("home");
//! clock.advance_ms(42.0);
//! assert_eq!(registry.end_timing("home"), Some(42.0));
//!
//! let token = registry.start_monitoring("home");
//! clock.advance_ms(16.0);
//! registry.record_frame("home", token);
//!
//! let summary = registry.metrics("home");
//! assert_eq!(summary.sample_count, 1);
//! ```

mod clock;
mod config;
mod error;
mod frame;
mod memory;
mod registry;
mod scope;
mod stats;
mod summary;
mod timing;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{MonitorConfig, DEFAULT_DROP_FACTOR, MIN_FRAME_INTERVAL, TARGET_FRAME_MS_60FPS};
pub use error::{ConfigError, ConfigResult};
pub use frame::{FrameSampler, SamplingToken, SessionState};
#[cfg(feature = "host-memory")]
pub use memory::SystemHeapProbe;
pub use memory::{FixedHeapProbe, HeapProbe, MemoryUsage, NoHeapProbe};
pub use registry::{default_heap_probe, MonitorRegistry};
pub use scope::ScopeMonitor;
pub use stats::{RunningStats, TimingStats};
pub use summary::{ListMetrics, MetricsSummary};
pub use timing::{Sample, TimingRecorder};
