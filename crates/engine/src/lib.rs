//! # Match engine (`engine`)
//!
//! ## Purpose
//!
//! `engine` sits on top of the fingerprint layer (`phash`) and the record
//! store (`store`). It turns a captured image into a query fingerprint,
//! retrieves candidate records by bucket proximity or full scan, scores them
//! by Hamming distance, and applies the match threshold. An optional cache
//! layer (`cache`) short-circuits repeat fingerprints and repeat searches.
//!
//! In a typical deployment you will:
//! - Enroll records into a [`store::RecordStore`], which derives and persists
//!   their bucket assignments.
//! - Use [`MatchEngine`] to service search requests over that store,
//!   selecting between bucketed and full-scan retrieval.
//!
//! ## Core Types
//!
//! - [`SearchStrategy`]: candidate retrieval strategy:
//!   - `Bucketed` — the query's bucket plus `radius` neighbors on each side.
//!   - `FullScan` — every enrolled record.
//! - [`EngineConfig`]: tuning knobs such as `threshold`, `radius`, and
//!   `use_parallel`.
//! - [`MatchQuery`]: raw image bytes plus the [`store::ImageKind`] searched.
//! - [`MatchOutcome`]: the decision, the closest record, and its distance.
//! - [`MatchEngine`]: production implementation of the [`Matcher`] trait
//!   that wires `phash`, `store`, and `cache` together.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use engine::{EngineConfig, MatchEngine, MatchQuery, Matcher};
//! use store::{ImageKind, RecordStore};
//!
//! let store = Arc::new(RecordStore::in_memory());
//! let engine = MatchEngine::new(store, EngineConfig::default()).expect("engine");
//!
//! let image = std::fs::read("face.png").expect("read image");
//! let outcome = engine
//!     .search(&MatchQuery::new(image, ImageKind::Face))
//!     .expect("search");
//! if outcome.matched {
//!     println!(
//!         "matched {:?} at distance {:?}",
//!         outcome.record.map(|r| r.id),
//!         outcome.distance
//!     );
//! }
//! ```
//!
//! ## Observability
//!
//! Install a [`SearchMetrics`] implementation via [`set_search_metrics`] to
//! record per-search latency and outcomes. This is typically done once
//! during service startup so all searches share the same metrics backend.

pub mod engine;
pub mod metrics;
pub mod types;

pub use crate::engine::{MatchEngine, Matcher};
pub use crate::metrics::{set_search_metrics, SearchMetrics};
pub use crate::types::{EngineConfig, MatchError, MatchOutcome, MatchQuery, SearchStrategy};
