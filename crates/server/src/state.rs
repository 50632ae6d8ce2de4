//! Shared application state.

use std::sync::Arc;

use cache::ResultCache;
use engine::MatchEngine;
use store::RecordStore;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Record store.
    pub store: Arc<RecordStore>,
    /// Search result cache, when enabled.
    pub cache: Option<Arc<ResultCache>>,
    /// Matching engine.
    pub engine: Arc<MatchEngine>,
}

impl ServerState {
    /// Build the store, cache, and engine from configuration.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = Arc::new(RecordStore::new(config.store.clone())?);
        let cache = build_cache(&config)?;

        let mut engine = MatchEngine::new(store.clone(), config.engine.clone())?;
        if let Some(cache) = cache.clone() {
            engine = engine.with_cache(cache);
        }

        Ok(Self {
            config: Arc::new(config),
            store,
            cache,
            engine: Arc::new(engine),
        })
    }
}

fn build_cache(config: &ServerConfig) -> ServerResult<Option<Arc<ResultCache>>> {
    if !config.cache.enabled {
        return Ok(None);
    }
    let backend = cache_backend(config)?;
    let cache = ResultCache::new(backend).with_ttl(config.cache.ttl());
    Ok(Some(Arc::new(cache)))
}

#[cfg(feature = "backend-redis")]
fn cache_backend(config: &ServerConfig) -> ServerResult<Box<dyn cache::CacheBackend>> {
    use crate::error::ServerError;

    match &config.cache.redis_url {
        Some(url) => {
            let redis = cache::RedisCache::connect(url)
                .map_err(|err| ServerError::Config(format!("redis connection failed: {err}")))?;
            Ok(Box::new(redis))
        }
        None => Ok(Box::new(cache::InMemoryCache::new())),
    }
}

#[cfg(not(feature = "backend-redis"))]
fn cache_backend(config: &ServerConfig) -> ServerResult<Box<dyn cache::CacheBackend>> {
    if config.cache.redis_url.is_some() {
        tracing::warn!(
            "redis_url configured but the backend-redis feature is disabled; using the in-process cache"
        );
    }
    Ok(Box::new(cache::InMemoryCache::new()))
}
