//! Perceptual fingerprints for captured biometric images.
//!
//! The fingerprint is an 8x8 average hash: the image is box-downsampled to a
//! 64-sample grayscale grid, and each sample contributes one bit depending on
//! whether it is strictly brighter than the grid mean. Two captures of the
//! same subject land within a small Hamming distance of each other, which is
//! what the matching layer ranks on.
//!
//! Alongside the hash itself this crate carries the two pure helpers the
//! matcher needs: [`hamming_distance`] for exact scoring, and the
//! [`bucket_of`]/[`neighbor_range`] projection used to prune candidates
//! before scoring.

mod bucket;
mod distance;
mod fingerprint;

pub use bucket::{
    bucket_of, neighbor_range, BucketConfig, DEFAULT_BUCKET_COUNT, DEFAULT_PREFIX_BITS,
};
pub use distance::hamming_distance;
pub use fingerprint::{
    fingerprint_image, fingerprint_pixels, Fingerprint, FINGERPRINT_BITS, GRID_DIM,
};

use thiserror::Error;

/// Errors produced while computing, parsing, or configuring fingerprints.
#[derive(Debug, Error)]
pub enum HashError {
    /// The input bytes could not be decoded as an image.
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// The resampled buffer contained no pixels, so no mean exists.
    #[error("resampled image contains no pixels")]
    EmptyImage,

    /// A bit sequence longer than a fingerprint can hold.
    #[error("fingerprint holds {actual} bits, expected at most {expected}")]
    FingerprintLength { expected: usize, actual: usize },

    /// A character other than '0' or '1' in a fingerprint string.
    #[error("fingerprint contains a non-binary character at position {position}")]
    FingerprintSyntax { position: usize },

    /// A bucket projection that cannot be applied to 64-bit fingerprints.
    #[error("invalid bucket configuration: {0}")]
    InvalidConfig(String),
}
