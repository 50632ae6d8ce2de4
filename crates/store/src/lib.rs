//! Enrollment record storage for the matching engine.
//!
//! Records are encoded with bincode, optionally zstd-compressed, and kept in
//! a pluggable key-value backend keyed by record id. The typed layer owns
//! everything the backends should not: record encoding, the write-time
//! recomputation of derived bucket fields, and the deterministic
//! enrollment-order sorting of query results that the matcher's tie-break
//! relies on.

mod backend;
mod query;
mod record;

#[cfg(feature = "backend-rocksdb")]
pub use backend::RocksDbBackend;
pub use backend::{BackendConfig, InMemoryBackend, StoreBackend};
pub use record::{ImageKind, Record, RECORD_SCHEMA_VERSION};

use phash::BucketConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use zstd::{decode_all, encode_all};

/// Compression codec options for stored records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    None,
    #[default]
    Zstd,
}

/// Compression behavior configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default)]
    pub codec: CompressionCodec,
    #[serde(default = "CompressionConfig::default_level")]
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: Self::default_level(),
        }
    }
}

impl CompressionConfig {
    fn default_level() -> i32 {
        3
    }

    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(encode_all(data, self.level)?),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(decode_all(data)?),
        }
    }
}

/// Config for initializing a record store.
///
/// The bucket projection lives here because the store is the single writer
/// of derived bucket fields; readers obtain the query-side projection from
/// the same value via [`RecordStore::bucket_of`], so the two cannot drift.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub bucket: BucketConfig,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_bucket(mut self, bucket: BucketConfig) -> Self {
        self.bucket = bucket;
        self
    }
}

/// Store failure taxonomy.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(#[from] bincode::Error),
    #[error("compression error: {0}")]
    Zstd(#[from] std::io::Error),
    #[error("unsupported record schema version {found}, expected {expected}")]
    SchemaVersion { expected: u16, found: u16 },
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Typed record store over a pluggable backend.
pub struct RecordStore {
    backend: Box<dyn StoreBackend>,
    cfg: StoreConfig,
}

impl RecordStore {
    /// Initialize or open a store using the configured backend.
    pub fn new(cfg: StoreConfig) -> Result<Self, StoreError> {
        let backend = cfg.backend.build()?;
        Ok(Self::with_backend(cfg, backend))
    }

    /// Build a store with a custom backend (e.g., a test double).
    pub fn with_backend(cfg: StoreConfig, backend: Box<dyn StoreBackend>) -> Self {
        Self { backend, cfg }
    }

    /// In-memory store with default configuration.
    pub fn in_memory() -> Self {
        Self::with_backend(StoreConfig::default(), Box::new(InMemoryBackend::new()))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    /// Insert or replace a record; last write wins on the record id.
    ///
    /// Derived bucket fields are recomputed from the fingerprints before the
    /// write, whatever the caller put in them. Returns the record as stored.
    pub fn insert(&self, record: Record) -> Result<Record, StoreError> {
        let record = self.refresh_buckets(record);
        let payload = self.encode_record(&record)?;
        self.backend.put(&record.id.to_string(), &payload)?;
        tracing::debug!(
            id = %record.id,
            face_bucket = ?record.face_bucket,
            thumb_bucket = ?record.thumb_bucket,
            "record stored"
        );
        Ok(record)
    }

    /// Batch insert multiple records in one backend write.
    pub fn batch_insert(&self, records: Vec<Record>) -> Result<Vec<Record>, StoreError> {
        let mut entries = Vec::with_capacity(records.len());
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            let record = self.refresh_buckets(record);
            entries.push((record.id.to_string(), self.encode_record(&record)?));
            stored.push(record);
        }
        self.backend.batch_put(entries)?;
        Ok(stored)
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: &Uuid) -> Result<Option<Record>, StoreError> {
        if let Some(data) = self.backend.get(&id.to_string())? {
            Ok(Some(self.decode_record(&data)?))
        } else {
            Ok(None)
        }
    }

    /// Remove a record by id.
    pub fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        self.backend.delete(&id.to_string())
    }

    /// Flush backend buffers if supported.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.backend.flush()
    }

    fn refresh_buckets(&self, mut record: Record) -> Record {
        record.face_bucket = record
            .face
            .as_ref()
            .map(|fp| phash::bucket_of(fp, &self.cfg.bucket));
        record.thumb_bucket = record
            .thumb
            .as_ref()
            .map(|fp| phash::bucket_of(fp, &self.cfg.bucket));
        record
    }

    pub(crate) fn decode_record(&self, data: &[u8]) -> Result<Record, StoreError> {
        let decompressed = self.cfg.compression.decompress(data)?;
        let record: Record = bincode::deserialize(&decompressed)?;
        if record.schema_version != RECORD_SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                expected: RECORD_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    fn encode_record(&self, record: &Record) -> Result<Vec<u8>, StoreError> {
        let encoded = bincode::serialize(record)?;
        self.cfg.compression.compress(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phash::Fingerprint;
    use serde_json::json;

    fn face_record(raw: u64) -> Record {
        Record::new(json!({"raw": raw})).with_face(Fingerprint::from_raw(raw))
    }

    #[test]
    fn insert_recomputes_buckets_from_fingerprints() {
        let store = RecordStore::in_memory();
        let mut record = face_record(0x7F00_0000_0000_0000);
        // Poison the derived fields; the store must not trust them.
        record.face_bucket = Some(999);
        record.thumb_bucket = Some(999);

        let stored = store.insert(record).expect("insert");
        assert_eq!(stored.face_bucket, Some(0x7F));
        assert_eq!(stored.thumb_bucket, None);

        let fetched = store.get(&stored.id).expect("get").expect("exists");
        assert_eq!(fetched, stored);
    }

    #[test]
    fn round_trip_preserves_profile_and_fingerprints() {
        let store = RecordStore::in_memory();
        let profile = json!({"first_name": "Grace", "additional_info": null});
        let record = Record::new(profile.clone())
            .with_face(Fingerprint::from_raw(3))
            .with_thumb(Fingerprint::from_raw(5));
        let stored = store.insert(record).expect("insert");

        let fetched = store.get(&stored.id).expect("get").expect("exists");
        assert_eq!(fetched.profile, profile);
        assert_eq!(fetched.face, Some(Fingerprint::from_raw(3)));
        assert_eq!(fetched.thumb, Some(Fingerprint::from_raw(5)));
    }

    #[test]
    fn uncompressed_stores_read_back_identically() {
        let cfg = StoreConfig::new()
            .with_compression(CompressionConfig::new(CompressionCodec::None, 0));
        let store = RecordStore::with_backend(cfg, Box::new(InMemoryBackend::new()));
        let stored = store.insert(face_record(42)).expect("insert");
        let fetched = store.get(&stored.id).expect("get").expect("exists");
        assert_eq!(fetched, stored);
    }

    #[test]
    fn last_write_wins_on_the_same_id() {
        let store = RecordStore::in_memory();
        let first = store.insert(face_record(1)).expect("insert");
        let mut second = face_record(2);
        second.id = first.id;
        store.insert(second).expect("overwrite");

        let fetched = store.get(&first.id).expect("get").expect("exists");
        assert_eq!(fetched.face, Some(Fingerprint::from_raw(2)));
    }

    #[test]
    fn batch_insert_stores_every_record() {
        let store = RecordStore::in_memory();
        let stored = store
            .batch_insert(vec![face_record(1), face_record(2), face_record(3)])
            .expect("batch");
        assert_eq!(stored.len(), 3);
        for record in &stored {
            assert!(store.get(&record.id).expect("get").is_some());
        }
    }

    #[test]
    fn delete_removes_the_record() {
        let store = RecordStore::in_memory();
        let stored = store.insert(face_record(9)).expect("insert");
        store.delete(&stored.id).expect("delete");
        assert!(store.get(&stored.id).expect("get").is_none());
    }

    #[test]
    fn foreign_schema_versions_are_rejected_on_read() {
        let store = RecordStore::in_memory();
        let mut record = face_record(7);
        record.schema_version = 99;
        let stored = store.insert(record).expect("insert");
        let err = store.get(&stored.id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::SchemaVersion {
                expected: RECORD_SCHEMA_VERSION,
                found: 99,
            }
        ));
    }
}
