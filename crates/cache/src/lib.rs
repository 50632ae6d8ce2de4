//! Best-effort TTL caching for the matching pipeline.
//!
//! Two kinds of entries share one keyspace: computed fingerprints keyed by
//! image content, and search outcomes keyed by query fingerprint. The cache
//! is an accelerator only. Every failure path degrades to a miss, so callers
//! never propagate cache errors and a dead cache backend costs latency, not
//! correctness.

mod backend;
mod clock;
mod result_cache;

#[cfg(feature = "backend-redis")]
pub use backend::RedisCache;
pub use backend::{CacheBackend, InMemoryCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use result_cache::{content_key, result_key, ResultCache};

use std::time::Duration;
use thiserror::Error;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache failure taxonomy.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CacheError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
