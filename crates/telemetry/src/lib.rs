//! Performance Telemetry Engine
//!
//! This crate turns the measurements collected by [`monitor`] into something
//! a UI layer can act on:
//!
//! - Advisory recommendations from a fixed threshold table
//! - Stable, serializable report export
//! - Frame scheduling drivers (tokio interval, host-driven pump, none)
//! - The [`PerfEngine`] facade exposing the whole API as synchronous,
//!   infallible calls
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use monitor::{ManualClock, MonitorConfig, MonitorRegistry, NoHeapProbe};
//! use telemetry::{NoFrameScheduler, PerfEngine};
//!
//! let clock = ManualClock::new();
//! let registry = MonitorRegistry::new(MonitorConfig::default())
//!     .with_clock(Arc::new(clock.clone()))
//!     .with_heap_probe(Arc::new(NoHeapProbe));
//! let engine = PerfEngine::with_registry(registry).with_scheduler(Arc::new(NoFrameScheduler));
//!
//! engine.start_screen_load("Settings");
//! clock.advance_ms(24.0);
//! engine.end_screen_load("Settings");
//!
//! let messages = engine.performance_recommendations("Settings");
//! assert_eq!(messages.len(), 1); // render time over budget
//!
//! let report = engine.export_report("Settings");
//! assert_eq!(report.metrics.render_time, 24.0);
//! ```
//!
//! # Modules
//!
//! - [`engine`] - The engine facade and timing guard
//! - [`recommend`] - Threshold evaluation
//! - [`report`] - Report export
//! - [`scheduler`] - Frame scheduling drivers
//! - [`thresholds`] - Threshold table

pub mod engine;
mod error;
pub mod recommend;
pub mod report;
pub mod scheduler;
pub mod thresholds;

pub use engine::{PerfEngine, SharedRegistry, TimingGuard};
pub use error::{ReportError, ReportResult};
pub use recommend::{recommend, recommend_with, recommendation_messages, Advisory};
pub use report::{export_report, export_report_at, PerfReport, ReportMetrics, ScrollPerformance};
pub use scheduler::{FrameCallback, FrameLoop, FramePump, FrameScheduler, IntervalScheduler, NoFrameScheduler};
pub use thresholds::Thresholds;
