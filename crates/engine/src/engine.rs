use std::sync::Arc;
use std::time::{Duration, Instant};

use cache::{content_key, result_key, ResultCache};
use phash::{fingerprint_image, neighbor_range, Fingerprint};
use store::{ImageKind, Record, RecordStore, StoreError};

use rayon::prelude::*;

use crate::metrics::metrics_recorder;
use crate::types::{EngineConfig, MatchError, MatchOutcome, MatchQuery, SearchStrategy};


/// Trait for a matching engine.
pub trait Matcher: Send + Sync {
    /// Run a single search and return the match decision.
    fn search(&self, query: &MatchQuery) -> Result<MatchOutcome, MatchError>;
}

/// Production matcher over a record store, with optional caching.
pub struct MatchEngine {
    store: Arc<RecordStore>,
    cache: Option<Arc<ResultCache>>,
    config: EngineConfig,
}

impl MatchEngine {
    /// Construct an engine over an existing store.
    pub fn new(store: Arc<RecordStore>, config: EngineConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            store,
            cache: None,
            config,
        })
    }

    /// Attach a fingerprint and result cache.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Convenience helper: in-memory store, no cache, default config.
    pub fn in_memory_default() -> Self {
        Self {
            store: Arc::new(RecordStore::in_memory()),
            cache: None,
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Search with an already-computed query fingerprint.
    ///
    /// This is the cacheable core of [`Matcher::search`]. Candidate
    /// retrieval failures degrade to a no-match outcome, which is returned
    /// to the caller but never cached.
    pub fn search_fingerprint(&self, fingerprint: &Fingerprint, kind: ImageKind) -> MatchOutcome {
        let start = Instant::now();

        if let Some(cache) = self.cache.as_deref() {
            let key = result_key(kind.as_str(), fingerprint);
            if let Some(outcome) = cache.get_result::<MatchOutcome>(&key) {
                tracing::debug!(kind = kind.as_str(), "search served from cache");
                self.observe(kind, start.elapsed(), outcome.matched);
                return outcome;
            }
        }

        let candidates = match self.retrieve_candidates(fingerprint, kind) {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(
                    kind = kind.as_str(),
                    error = %err,
                    "candidate retrieval failed, returning no match"
                );
                self.observe(kind, start.elapsed(), false);
                return MatchOutcome::no_match();
            }
        };

        let outcome = match self.best_candidate(fingerprint, kind, &candidates) {
            Some((index, distance)) => MatchOutcome {
                matched: distance < self.config.threshold,
                record: Some(candidates[index].clone()),
                distance: Some(distance),
            },
            None => MatchOutcome::no_match(),
        };

        if let Some(cache) = self.cache.as_deref() {
            cache.put_result(&result_key(kind.as_str(), fingerprint), &outcome);
        }

        tracing::debug!(
            kind = kind.as_str(),
            candidates = candidates.len(),
            matched = outcome.matched,
            distance = ?outcome.distance,
            "search completed"
        );
        self.observe(kind, start.elapsed(), outcome.matched);
        outcome
    }

    /// Fingerprint the query image, consulting the cache when one is attached.
    fn query_fingerprint(&self, query: &MatchQuery) -> Result<Fingerprint, MatchError> {
        let Some(cache) = self.cache.as_deref() else {
            return Ok(fingerprint_image(&query.image)?);
        };

        let key = content_key(query.kind.as_str(), &query.image);
        if let Some(fingerprint) = cache.get_fingerprint(&key) {
            return Ok(fingerprint);
        }
        let fingerprint = fingerprint_image(&query.image)?;
        cache.put_fingerprint(&key, &fingerprint);
        Ok(fingerprint)
    }

    fn retrieve_candidates(
        &self,
        fingerprint: &Fingerprint,
        kind: ImageKind,
    ) -> Result<Vec<Record>, StoreError> {
        match self.config.strategy {
            SearchStrategy::Bucketed => {
                let bucket = self.store.bucket_of(fingerprint);
                let (low, high) = neighbor_range(bucket, self.config.radius);
                self.store.query_by_bucket_range(kind, low, high)
            }
            SearchStrategy::FullScan => self.store.scan_all(),
        }
    }

    /// Index and distance of the closest candidate carrying the kind's
    /// fingerprint. Ties resolve to the lowest index, which after the
    /// store's enrollment-order sort means the earliest-enrolled record.
    fn best_candidate(
        &self,
        fingerprint: &Fingerprint,
        kind: ImageKind,
        candidates: &[Record],
    ) -> Option<(usize, u32)> {
        if self.config.use_parallel {
            candidates
                .par_iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    record
                        .fingerprint(kind)
                        .map(|candidate| (index, fingerprint.distance(candidate)))
                })
                .min_by_key(|&(index, distance)| (distance, index))
        } else {
            candidates
                .iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    record
                        .fingerprint(kind)
                        .map(|candidate| (index, fingerprint.distance(candidate)))
                })
                .min_by_key(|&(index, distance)| (distance, index))
        }
    }

    fn observe(&self, kind: ImageKind, latency: Duration, matched: bool) {
        if let Some(recorder) = metrics_recorder() {
            recorder.record_search(kind, self.config.strategy, latency, matched);
        }
    }
}

impl Matcher for MatchEngine {
    fn search(&self, query: &MatchQuery) -> Result<MatchOutcome, MatchError> {
        let fingerprint = self.query_fingerprint(query)?;
        Ok(self.search_fingerprint(&fingerprint, query.kind))
    }
}
