//! Prometheus metrics wiring.
//!
//! Installs the global [`metrics`] recorder, registers a [`SearchMetrics`]
//! implementation with the engine, and renders the scrape payload for the
//! `/metrics` endpoint.

use std::sync::Arc;
use std::time::Duration;

use engine::{SearchMetrics, SearchStrategy};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use store::ImageKind;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder and hook the engine's search metrics
/// into it. The global recorder can only be installed once per process.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle);
    engine::set_search_metrics(Some(Arc::new(PrometheusSearchMetrics)));
    Ok(())
}

/// Render the current metrics in Prometheus exposition format.
///
/// Returns `None` until [`init_metrics`] has run.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

/// Bridges engine search observations to the `metrics` macros.
pub struct PrometheusSearchMetrics;

impl SearchMetrics for PrometheusSearchMetrics {
    fn record_search(
        &self,
        kind: ImageKind,
        strategy: SearchStrategy,
        latency: Duration,
        matched: bool,
    ) {
        counter!(
            "biomatch_searches_total",
            "kind" => kind.as_str(),
            "strategy" => strategy.as_str(),
            "matched" => if matched { "true" } else { "false" },
        )
        .increment(1);
        histogram!(
            "biomatch_search_duration_seconds",
            "kind" => kind.as_str(),
        )
        .record(latency.as_secs_f64());
    }
}
