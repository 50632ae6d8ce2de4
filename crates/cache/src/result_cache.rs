//! Typed cache layer for fingerprints and search outcomes.

use crate::backend::{CacheBackend, InMemoryCache};
use crate::DEFAULT_TTL;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use phash::Fingerprint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const CONTENT_KEY_CHARS: usize = 32;
const RESULT_KEY_PREFIX: &str = "search:";

/// Cache key for a fingerprint computed from raw image bytes.
///
/// The base64 of the image is truncated so keys stay bounded; distinct
/// images can collide on a shared prefix, which at worst re-serves another
/// image's fingerprint until expiry. Same image, same key, always.
pub fn content_key(kind: &str, image: &[u8]) -> String {
    let encoded = BASE64.encode(image);
    let prefix_len = encoded.len().min(CONTENT_KEY_CHARS);
    format!("image:{kind}:{}", &encoded[..prefix_len])
}

/// Cache key for the search outcome of one query fingerprint.
pub fn result_key(kind: &str, fingerprint: &Fingerprint) -> String {
    format!("{RESULT_KEY_PREFIX}{kind}:{fingerprint}")
}

/// Best-effort cache for pipeline intermediates.
///
/// Reads that fail or return something unparseable are misses; writes that
/// fail are logged and forgotten. Callers get no `Result` to propagate.
pub struct ResultCache {
    backend: Box<dyn CacheBackend>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            backend,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Process-local cache with the default TTL.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryCache::new()))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_fingerprint(&self, key: &str) -> Option<Fingerprint> {
        match self.backend.get(key) {
            Ok(Some(text)) => match text.parse::<Fingerprint>() {
                Ok(fingerprint) => Some(fingerprint),
                Err(err) => {
                    tracing::warn!(key, error = %err, "ignoring corrupt cached fingerprint");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "fingerprint cache read failed");
                None
            }
        }
    }

    pub fn put_fingerprint(&self, key: &str, fingerprint: &Fingerprint) {
        if let Err(err) = self.backend.set_ex(key, &fingerprint.to_string(), self.ttl) {
            tracing::warn!(key, error = %err, "fingerprint cache write failed");
        }
    }

    pub fn get_result<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(key, error = %err, "ignoring corrupt cached result");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "result cache read failed");
                None
            }
        }
    }

    pub fn put_result<T: Serialize>(&self, key: &str, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(key, error = %err, "result serialization failed");
                return;
            }
        };
        if let Err(err) = self.backend.set_ex(key, &text, self.ttl) {
            tracing::warn!(key, error = %err, "result cache write failed");
        }
    }

    /// Drop every cached search outcome.
    ///
    /// Called after enrollment changes. Any cached outcome could name a
    /// best match the change displaced, so the whole result keyspace goes
    /// rather than tracking which fingerprints a record could answer.
    pub fn invalidate(&self, record_id: &str) {
        match self.backend.delete_prefix(RESULT_KEY_PREFIX) {
            Ok(removed) => {
                tracing::debug!(record_id, removed, "search results invalidated");
            }
            Err(err) => {
                tracing::warn!(record_id, error = %err, "cache invalidation failed");
            }
        }
    }
}
