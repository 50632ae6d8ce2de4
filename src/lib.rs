//! Workspace umbrella crate for perceptual-hash biometric matching.
//!
//! This crate stitches fingerprinting, record storage, result caching, and
//! the match engine together so callers can enroll captured images and run
//! searches through a single API entry point.

pub mod config;

pub use cache::{
    content_key, result_key, CacheBackend, CacheError, Clock, InMemoryCache, ManualClock,
    ResultCache, SystemClock, DEFAULT_TTL,
};
pub use engine::{
    set_search_metrics, EngineConfig, MatchEngine, MatchError, MatchOutcome, MatchQuery, Matcher,
    SearchMetrics, SearchStrategy,
};
pub use phash::{
    bucket_of, fingerprint_image, fingerprint_pixels, hamming_distance, neighbor_range,
    BucketConfig, Fingerprint, HashError, DEFAULT_BUCKET_COUNT, DEFAULT_PREFIX_BITS,
    FINGERPRINT_BITS, GRID_DIM,
};
pub use store::{
    BackendConfig, CompressionCodec, CompressionConfig, ImageKind, InMemoryBackend, Record,
    RecordStore, StoreBackend, StoreConfig, StoreError, RECORD_SCHEMA_VERSION,
};

#[cfg(feature = "backend-redis")]
pub use cache::RedisCache;
#[cfg(feature = "backend-rocksdb")]
pub use store::RocksDbBackend;

pub use config::{BiomatchConfig, CacheYamlConfig, ConfigLoadError};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while building or persisting an enrollment.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fingerprinting failed: {0}")]
    Hash(#[from] HashError),
    #[error("record store failure: {0}")]
    Store(#[from] StoreError),
}

/// Build an enrollment record from a profile payload and captured images.
///
/// Fingerprints are computed for whichever images are present; absent images
/// leave the corresponding field unset. Derived bucket fields stay empty
/// here, the store recomputes them on every write.
pub fn enroll_record(
    profile: Value,
    face_image: Option<&[u8]>,
    thumb_image: Option<&[u8]>,
) -> Result<Record, PipelineError> {
    let mut record = Record::new(profile);
    if let Some(bytes) = face_image {
        record = record.with_face(fingerprint_image(bytes)?);
    }
    if let Some(bytes) = thumb_image {
        record = record.with_thumb(fingerprint_image(bytes)?);
    }
    Ok(record)
}

/// Enroll and persist in one step.
///
/// Returns the record as stored, with derived bucket fields populated by the
/// store's write path.
pub fn enroll_and_store(
    store: &RecordStore,
    profile: Value,
    face_image: Option<&[u8]>,
    thumb_image: Option<&[u8]>,
) -> Result<Record, PipelineError> {
    let record = enroll_record(profile, face_image, thumb_image)?;
    let stored = store.insert(record)?;
    tracing::debug!(
        id = %stored.id,
        face = stored.face.is_some(),
        thumb = stored.thumb.is_some(),
        "record enrolled"
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn png_bytes(shade: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let img = image::GrayImage::from_fn(32, 32, |x, y| image::Luma([shade(x, y)]));
        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .expect("png encode");
        cursor.into_inner()
    }

    #[test]
    fn enroll_record_fingerprints_each_present_image() {
        let face = png_bytes(|x, _| (x * 8) as u8);
        let thumb = png_bytes(|_, y| (y * 8) as u8);
        let record = enroll_record(json!({"first_name": "Ada"}), Some(&face), Some(&thumb))
            .expect("enroll");

        assert_eq!(record.face, Some(fingerprint_image(&face).expect("face fp")));
        assert_eq!(
            record.thumb,
            Some(fingerprint_image(&thumb).expect("thumb fp"))
        );
        assert_eq!(record.face_bucket, None);
        assert_eq!(record.profile["first_name"], "Ada");
    }

    #[test]
    fn enroll_record_without_images_has_no_fingerprints() {
        let record = enroll_record(json!({}), None, None).expect("enroll");
        assert!(record.face.is_none());
        assert!(record.thumb.is_none());
    }

    #[test]
    fn enroll_record_surfaces_decode_failures() {
        let result = enroll_record(json!({}), Some(b"not a png"), None);
        assert!(matches!(result, Err(PipelineError::Hash(_))));
    }

    #[test]
    fn enroll_and_store_populates_buckets() {
        let store = RecordStore::in_memory();
        let face = png_bytes(|x, _| (x * 8) as u8);
        let stored =
            enroll_and_store(&store, json!({"first_name": "Ada"}), Some(&face), None)
                .expect("enroll");

        let fp = stored.face.expect("face fingerprint");
        assert_eq!(stored.face_bucket, Some(store.bucket_of(&fp)));
        assert_eq!(stored.thumb_bucket, None);
        assert!(store.get(&stored.id).expect("get").is_some());
    }
}
