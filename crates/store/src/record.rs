use chrono::{DateTime, Utc};
use phash::Fingerprint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Bump this value whenever the stored `Record` layout changes.
pub const RECORD_SCHEMA_VERSION: u16 = 1;

/// Which captured image a record field or a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Face,
    Thumb,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Face => "face",
            ImageKind::Thumb => "thumb",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored enrollment: fingerprints plus the opaque profile they belong to.
///
/// `face_bucket` and `thumb_bucket` are derived fields. The store recomputes
/// them from the fingerprints on every write, so the values a range query
/// sees are always consistent with the projection the store was built with.
/// The profile payload is carried through untouched; the matching core never
/// interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub id: Uuid,
    #[serde(with = "profile_serde")]
    pub profile: Value,
    pub face: Option<Fingerprint>,
    pub thumb: Option<Fingerprint>,
    pub face_bucket: Option<u32>,
    pub thumb_bucket: Option<u32>,
    pub enrolled_at: DateTime<Utc>,
}

const fn default_schema_version() -> u16 {
    RECORD_SCHEMA_VERSION
}

impl Record {
    /// Fresh record with a random id, stamped now, carrying no fingerprints.
    pub fn new(profile: Value) -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION,
            id: Uuid::new_v4(),
            profile,
            face: None,
            thumb: None,
            face_bucket: None,
            thumb_bucket: None,
            enrolled_at: Utc::now(),
        }
    }

    pub fn with_face(mut self, fingerprint: Fingerprint) -> Self {
        self.face = Some(fingerprint);
        self
    }

    pub fn with_thumb(mut self, fingerprint: Fingerprint) -> Self {
        self.thumb = Some(fingerprint);
        self
    }

    /// Fingerprint for the selected image kind, if enrolled.
    pub fn fingerprint(&self, kind: ImageKind) -> Option<&Fingerprint> {
        match kind {
            ImageKind::Face => self.face.as_ref(),
            ImageKind::Thumb => self.thumb.as_ref(),
        }
    }

    /// Derived bucket for the selected image kind, if enrolled.
    pub fn bucket(&self, kind: ImageKind) -> Option<u32> {
        match kind {
            ImageKind::Face => self.face_bucket,
            ImageKind::Thumb => self.thumb_bucket,
        }
    }
}

// Arbitrary JSON cannot survive a non-self-describing codec, so the profile
// travels as a JSON byte blob inside the bincode frame. Human-readable
// formats get the value as-is.
mod profile_serde {
    use serde::de::Error as DeError;
    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub(super) fn serialize<S>(value: &Value, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            return value.serialize(serializer);
        }
        let bytes = serde_json::to_vec(value).map_err(SerError::custom)?;
        serializer.serialize_bytes(&bytes)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            return Value::deserialize(deserializer);
        }
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        serde_json::from_slice(&bytes).map_err(DeError::custom)
    }
}
