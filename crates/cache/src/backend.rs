//! Cache backend trait and implementations.

use crate::clock::{Clock, SystemClock};
use crate::CacheError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Key-value cache with per-entry expiry.
///
/// Values are strings; callers serialize structured payloads before storing
/// them. `delete_prefix` backs coarse invalidation and returns how many
/// entries were dropped.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    fn delete(&self, key: &str) -> Result<(), CacheError>;
    fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}

/// Process-local cache with lazy expiry.
///
/// Expired entries are dropped when read; nothing sweeps in the background,
/// so an entry past its TTL still occupies memory until the next lookup.
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Build with an injected clock so tests can control expiry.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        let mut guard = self
            .entries
            .write()
            .map_err(|_| CacheError::backend("poisoned cache lock"))?;
        match guard.get(key) {
            Some((_, expires_at)) if *expires_at <= now => {
                guard.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = self.clock.now() + ttl;
        self.entries
            .write()
            .map_err(|_| CacheError::backend("poisoned cache lock"))?
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::backend("poisoned cache lock"))?
            .remove(key);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| CacheError::backend("poisoned cache lock"))?;
        let before = guard.len();
        guard.retain(|key, _| !key.starts_with(prefix));
        Ok(before - guard.len())
    }
}

#[cfg(feature = "backend-redis")]
mod redis_backend {
    use super::CacheBackend;
    use crate::CacheError;
    use redis::Commands;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Shared cache over a single synchronous Redis connection.
    pub struct RedisCache {
        conn: Mutex<redis::Connection>,
    }

    impl RedisCache {
        /// Connect to a Redis server, e.g. `redis://127.0.0.1:6379/`.
        pub fn connect(url: &str) -> Result<Self, CacheError> {
            let client = redis::Client::open(url).map_err(CacheError::backend)?;
            let conn = client.get_connection().map_err(CacheError::backend)?;
            Ok(Self {
                conn: Mutex::new(conn),
            })
        }
    }

    impl CacheBackend for RedisCache {
        fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let mut conn = self
                .conn
                .lock()
                .map_err(|_| CacheError::backend("poisoned connection lock"))?;
            conn.get(key).map_err(CacheError::backend)
        }

        fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            let mut conn = self
                .conn
                .lock()
                .map_err(|_| CacheError::backend("poisoned connection lock"))?;
            let seconds = ttl.as_secs().max(1) as usize;
            conn.set_ex(key, value, seconds).map_err(CacheError::backend)
        }

        fn delete(&self, key: &str) -> Result<(), CacheError> {
            let mut conn = self
                .conn
                .lock()
                .map_err(|_| CacheError::backend("poisoned connection lock"))?;
            conn.del(key).map_err(CacheError::backend)
        }

        fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
            let mut conn = self
                .conn
                .lock()
                .map_err(|_| CacheError::backend("poisoned connection lock"))?;
            let keys: Vec<String> = conn
                .keys(format!("{prefix}*"))
                .map_err(CacheError::backend)?;
            let removed = keys.len();
            if !keys.is_empty() {
                conn.del::<_, ()>(keys).map_err(CacheError::backend)?;
            }
            Ok(removed)
        }
    }
}

#[cfg(feature = "backend-redis")]
pub use redis_backend::RedisCache;
