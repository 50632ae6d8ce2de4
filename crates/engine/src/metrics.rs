// Metrics hooks for the `engine` crate.
//
// Callers install a global `SearchMetrics` implementation via
// [`set_search_metrics`], then `MatchEngine` will report per-search latency
// and outcomes. This keeps instrumentation decoupled from any specific
// metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::SearchStrategy;
use store::ImageKind;

/// Metrics observer for search operations.
pub trait SearchMetrics: Send + Sync {
    /// Record the outcome of a search.
    ///
    /// `kind` is the image kind that was searched, `strategy` is the
    /// effective [`SearchStrategy`], `latency` is the wall-clock duration of
    /// the search, and `matched` is whether the best candidate cleared the
    /// distance threshold.
    fn record_search(
        &self,
        kind: ImageKind,
        strategy: SearchStrategy,
        latency: Duration,
        matched: bool,
    );
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn SearchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn SearchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn SearchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global search metrics recorder.
///
/// This is typically called once during service startup so all `MatchEngine`
/// instances share the same metrics backend.
pub fn set_search_metrics(recorder: Option<Arc<dyn SearchMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
