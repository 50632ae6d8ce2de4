//! Failure-path behavior across the pipeline: caller-data errors surface,
//! collaborator failures degrade without reaching the caller.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use biomatch::{
    enroll_record, BiomatchConfig, CacheBackend, CacheError, ConfigLoadError, EngineConfig,
    ImageKind, MatchEngine, MatchError, MatchQuery, Matcher, PipelineError, RecordStore,
    ResultCache, StoreBackend, StoreConfig, StoreError,
};
use serde_json::json;

fn png_bytes(shade: impl Fn(u32, u32) -> u8) -> Vec<u8> {
    let img = image::GrayImage::from_fn(32, 32, |x, y| image::Luma([shade(x, y)]));
    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("png encode");
    cursor.into_inner()
}

struct FailingStore;

impl StoreBackend for FailingStore {
    fn put(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::backend("store offline"))
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::backend("store offline"))
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::backend("store offline"))
    }

    fn batch_put(&self, _entries: Vec<(String, Vec<u8>)>) -> Result<(), StoreError> {
        Err(StoreError::backend("store offline"))
    }

    fn scan(
        &self,
        _visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        Err(StoreError::backend("store offline"))
    }
}

struct FailingCache;

impl CacheBackend for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::backend("cache offline"))
    }

    fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("cache offline"))
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend("cache offline"))
    }

    fn delete_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Err(CacheError::backend("cache offline"))
    }
}

#[test]
fn undecodable_enrollment_images_error() {
    let result = enroll_record(json!({}), Some(b"garbage bytes"), None);
    assert!(matches!(result, Err(PipelineError::Hash(_))));

    let result = enroll_record(json!({}), None, Some(b"also garbage"));
    assert!(matches!(result, Err(PipelineError::Hash(_))));
}

#[test]
fn empty_store_searches_are_clean_no_matches() {
    let store = Arc::new(RecordStore::in_memory());
    let engine = MatchEngine::new(store, EngineConfig::default()).expect("engine");

    let outcome = engine
        .search(&MatchQuery::new(
            png_bytes(|x, _| (x * 8) as u8),
            ImageKind::Face,
        ))
        .expect("search");
    assert!(!outcome.matched);
    assert!(outcome.record.is_none());
    assert!(outcome.distance.is_none());
}

#[test]
fn store_failures_degrade_to_no_match() {
    let store = Arc::new(RecordStore::with_backend(
        StoreConfig::default(),
        Box::new(FailingStore),
    ));
    let engine = MatchEngine::new(store, EngineConfig::default()).expect("engine");

    let outcome = engine
        .search(&MatchQuery::new(
            png_bytes(|x, _| (x * 8) as u8),
            ImageKind::Face,
        ))
        .expect("search");
    assert!(!outcome.matched);
    assert!(outcome.record.is_none());
}

#[test]
fn cache_failures_fall_back_to_computation() {
    let store = Arc::new(RecordStore::in_memory());
    let bytes = png_bytes(|x, _| (x * 8) as u8);
    let record = enroll_record(json!({"first_name": "Ada"}), Some(&bytes), None).expect("enroll");
    store.insert(record).expect("insert");

    let cache = Arc::new(ResultCache::new(Box::new(FailingCache)));
    let engine = MatchEngine::new(store, EngineConfig::default())
        .expect("engine")
        .with_cache(cache);

    let outcome = engine
        .search(&MatchQuery::new(bytes, ImageKind::Face))
        .expect("search");
    assert!(outcome.matched);
    assert_eq!(outcome.distance, Some(0));
}

#[test]
fn invalid_engine_configs_are_rejected() {
    let store = Arc::new(RecordStore::in_memory());

    let result = MatchEngine::new(store.clone(), EngineConfig::default().with_threshold(0));
    assert!(matches!(result.err(), Some(MatchError::InvalidConfig(_))));

    let result = MatchEngine::new(store, EngineConfig::default().with_threshold(65));
    assert!(matches!(result.err(), Some(MatchError::InvalidConfig(_))));
}

#[test]
fn missing_config_files_are_io_errors() {
    let result = BiomatchConfig::from_file("/nonexistent/biomatch.yaml");
    assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let result = BiomatchConfig::from_yaml("version: [unterminated");
    assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
}
