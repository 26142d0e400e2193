//! Pulse - drives a simulated UI session through the telemetry engine
//! and prints the exported report.

mod config;

use std::time::Duration;

use anyhow::Context;
use config::PulseConfig;
use monitor::MemoryUsage;
use telemetry::PerfEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SCREEN: &str = "Feed";
const LIST_SCOPE: &str = "feed-list";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = PulseConfig::load().context("failed to load pulse config")?;
    tracing::info!(
        target_frame_ms = config.monitor.target_frame_ms,
        drop_factor = config.monitor.drop_factor,
        "Starting pulse"
    );

    let engine = PerfEngine::new(config.monitor).with_thresholds(config.thresholds);

    engine.start_screen_load(SCREEN);
    tokio::time::sleep(Duration::from_millis(12)).await;
    if let Some(elapsed) = engine.end_screen_load(SCREEN) {
        tracing::info!(screen = SCREEN, elapsed_ms = elapsed, "Screen loaded");
    }

    if !engine.start_monitoring(LIST_SCOPE) {
        tracing::warn!(scope = LIST_SCOPE, "Frame sampling unavailable");
    }

    for batch in 0..10u64 {
        {
            let _render = engine.time_scope(LIST_SCOPE);
            tokio::time::sleep(Duration::from_millis(4)).await;
        }
        engine.record_scroll_event(LIST_SCOPE);
        engine.update_list_metrics(LIST_SCOPE, 500, 12, 12 + batch * 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    engine.stop_monitoring(LIST_SCOPE);

    let summary = engine.metrics(LIST_SCOPE);
    tracing::info!(
        scope = LIST_SCOPE,
        fps = summary.average_fps,
        drop_rate = summary.drop_rate(),
        "Sampling finished"
    );
    match summary.memory {
        Some(memory) => tracing::info!(
            used = %MemoryUsage::format_bytes(memory.used_bytes),
            total = %MemoryUsage::format_bytes(memory.total_bytes),
            limited = memory.limit_bytes.is_some(),
            "Process memory"
        ),
        None => tracing::info!("Process memory unavailable"),
    }

    for scope in [SCREEN, LIST_SCOPE] {
        for message in engine.performance_recommendations(scope) {
            tracing::info!(scope, "{message}");
        }
        println!("{}", engine.export_metrics(scope));
    }

    Ok(())
}
