use crate::Fingerprint;

/// Count of differing bit positions between two fingerprints.
///
/// Range `[0, 64]`. Pure and symmetric; zero exactly when the operands are
/// equal. Both operands are 64-bit by construction, so there is no runtime
/// length check to fail — mismatched lengths are rejected where bit strings
/// are parsed, not here.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> u32 {
    (a.bits() ^ b.bits()).count_ones()
}

impl Fingerprint {
    /// Hamming distance to `other`.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        hamming_distance(self, other)
    }
}
