use crate::{Fingerprint, HashError, FINGERPRINT_BITS};
use serde::{Deserialize, Serialize};

/// Leading fingerprint bits folded into the bucket value by default.
pub const DEFAULT_PREFIX_BITS: u32 = 8;

/// Default number of buckets the projection reduces into.
pub const DEFAULT_BUCKET_COUNT: u32 = 256;

/// Projection of fingerprints onto coarse numeric buckets.
///
/// The bucket id is the first `prefix_bits` bits of the fingerprint read as
/// an unsigned integer, modulo `bucket_count`. Fingerprints at small Hamming
/// distance tend to share a prefix and therefore a bucket, which is all the
/// candidate pruning relies on — the projection is a recall heuristic, never
/// part of the match decision itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    #[serde(default = "BucketConfig::default_prefix_bits")]
    pub prefix_bits: u32,
    #[serde(default = "BucketConfig::default_bucket_count")]
    pub bucket_count: u32,
}

impl BucketConfig {
    fn default_prefix_bits() -> u32 {
        DEFAULT_PREFIX_BITS
    }

    fn default_bucket_count() -> u32 {
        DEFAULT_BUCKET_COUNT
    }

    /// Reject projections that cannot be applied to 64-bit fingerprints.
    pub fn validate(&self) -> Result<(), HashError> {
        if self.prefix_bits == 0 || self.prefix_bits as usize > FINGERPRINT_BITS {
            return Err(HashError::InvalidConfig(format!(
                "prefix_bits must be between 1 and {FINGERPRINT_BITS}, got {}",
                self.prefix_bits
            )));
        }
        if self.bucket_count == 0 {
            return Err(HashError::InvalidConfig(
                "bucket_count must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            prefix_bits: DEFAULT_PREFIX_BITS,
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

/// Bucket id for a fingerprint under `config`.
///
/// Deterministic and stable: the same fingerprint and config always map to
/// the same bucket. A near-duplicate can still land in a distant bucket when
/// the differing bits fall inside the prefix; widening the search radius is
/// the knob for that, not this function.
pub fn bucket_of(fingerprint: &Fingerprint, config: &BucketConfig) -> u32 {
    let bits = config.prefix_bits.clamp(1, FINGERPRINT_BITS as u32);
    let prefix = fingerprint.bits() >> (FINGERPRINT_BITS as u32 - bits);
    (prefix % u64::from(config.bucket_count)) as u32
}

/// Inclusive bucket range `[bucket - radius, bucket + radius]`, clamped at
/// zero on the left. Radius widens recall at linear cost in candidates.
pub fn neighbor_range(bucket: u32, radius: u32) -> (u32, u32) {
    (bucket.saturating_sub(radius), bucket.saturating_add(radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_fingerprint_same_bucket() {
        let config = BucketConfig::default();
        let fp = Fingerprint::from_raw(0xABCD_EF01_2345_6789);
        assert_eq!(bucket_of(&fp, &config), bucket_of(&fp, &config));
    }

    #[test]
    fn default_projection_reads_the_top_byte() {
        let config = BucketConfig::default();
        let fp = Fingerprint::from_raw(0x7F00_0000_0000_0000);
        assert_eq!(bucket_of(&fp, &config), 0x7F);
    }

    #[test]
    fn narrow_prefix_reduces_modulo_bucket_count() {
        let config = BucketConfig {
            prefix_bits: 16,
            bucket_count: 10,
        };
        let fp = Fingerprint::from_raw(0x1234_0000_0000_0000);
        assert_eq!(bucket_of(&fp, &config), (0x1234 % 10) as u32);
    }

    #[test]
    fn neighbor_range_is_inclusive_and_clamped() {
        assert_eq!(neighbor_range(5, 1), (4, 6));
        assert_eq!(neighbor_range(0, 1), (0, 1));
        assert_eq!(neighbor_range(0, 0), (0, 0));
    }

    #[test]
    fn wide_radius_covers_every_bucket() {
        let config = BucketConfig::default();
        let (low, high) = neighbor_range(0, config.bucket_count);
        assert_eq!(low, 0);
        assert!(high >= config.bucket_count - 1);
    }

    #[test]
    fn validate_rejects_degenerate_projections() {
        let zero_prefix = BucketConfig {
            prefix_bits: 0,
            bucket_count: 256,
        };
        assert!(zero_prefix.validate().is_err());

        let too_wide = BucketConfig {
            prefix_bits: 65,
            bucket_count: 256,
        };
        assert!(too_wide.validate().is_err());

        let no_buckets = BucketConfig {
            prefix_bits: 8,
            bucket_count: 0,
        };
        assert!(no_buckets.validate().is_err());
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let config: BucketConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, BucketConfig::default());
    }
}
