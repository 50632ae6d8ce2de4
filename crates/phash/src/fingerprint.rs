use crate::HashError;
use image::DynamicImage;
use std::fmt;
use std::str::FromStr;

/// Width and height of the downsampled intensity grid.
pub const GRID_DIM: u32 = 8;

/// Bits in a fingerprint; one per grid sample.
pub const FINGERPRINT_BITS: usize = (GRID_DIM * GRID_DIM) as usize;

/// 64-bit average-hash signature of an image.
///
/// Bits are ordered MSB-first in raster order: the most significant bit is
/// the top-left grid sample. The canonical text form is a 64-character
/// string of `'0'`/`'1'`, which is also how the value serializes.
/// Immutable once computed; equality and Hamming distance are the only
/// comparisons that mean anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap an already-packed bit pattern.
    pub const fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    /// The packed bit pattern.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Pack a bit sequence, MSB first.
    ///
    /// Sequences shorter than 64 bits are left-padded with zeros, the guard
    /// the capture pipeline applies to malformed resample output. Longer
    /// sequences are rejected.
    pub fn from_bits(bits: &[bool]) -> Result<Self, HashError> {
        if bits.len() > FINGERPRINT_BITS {
            return Err(HashError::FingerprintLength {
                expected: FINGERPRINT_BITS,
                actual: bits.len(),
            });
        }
        let value = bits.iter().fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit));
        Ok(Self(value))
    }

    /// Parse the canonical `'0'`/`'1'` text form.
    ///
    /// Accepts up to 64 characters and left-pads shorter input with zeros,
    /// matching [`Fingerprint::from_bits`]. Anything other than binary
    /// digits is rejected with the offending position.
    pub fn from_bit_string(text: &str) -> Result<Self, HashError> {
        if text.len() > FINGERPRINT_BITS {
            return Err(HashError::FingerprintLength {
                expected: FINGERPRINT_BITS,
                actual: text.len(),
            });
        }
        let mut value = 0u64;
        for (position, ch) in text.chars().enumerate() {
            value <<= 1;
            match ch {
                '0' => {}
                '1' => value |= 1,
                _ => return Err(HashError::FingerprintSyntax { position }),
            }
        }
        Ok(Self(value))
    }

    /// Render as the canonical 64-character bit string.
    pub fn to_bit_string(self) -> String {
        format!("{:0width$b}", self.0, width = FINGERPRINT_BITS)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl FromStr for Fingerprint {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bit_string(s)
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_bit_string())
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Fingerprint::from_bit_string(&text).map_err(serde::de::Error::custom)
    }
}

/// Compute the average-hash fingerprint of encoded image bytes.
///
/// Decodes with whatever codecs the `image` crate was built with, then
/// defers to [`fingerprint_pixels`]. Identical bytes always produce an
/// identical fingerprint; the function is one-way and makes no robustness
/// promise against deliberate distortion.
pub fn fingerprint_image(image_bytes: &[u8]) -> Result<Fingerprint, HashError> {
    let decoded = image::load_from_memory(image_bytes)?;
    fingerprint_pixels(&decoded)
}

/// Compute the average-hash fingerprint of an already-decoded image.
///
/// Box-downsamples to the 8x8 grid, converts to 8-bit luma, takes the
/// arithmetic mean of the 64 samples, and emits bit 1 for every sample
/// strictly brighter than the mean, in raster order.
pub fn fingerprint_pixels(img: &DynamicImage) -> Result<Fingerprint, HashError> {
    let samples = downsample(img);
    if samples.is_empty() {
        return Err(HashError::EmptyImage);
    }
    let mean = samples.iter().map(|&v| f64::from(v)).sum::<f64>() / samples.len() as f64;
    let bits: Vec<bool> = samples.iter().map(|&v| f64::from(v) > mean).collect();
    Fingerprint::from_bits(&bits)
}

/// Box-downsample to the hash grid, flattened to row-major luma samples.
fn downsample(img: &DynamicImage) -> Vec<u8> {
    let gray = img.thumbnail_exact(GRID_DIM, GRID_DIM).to_luma8();
    gray.pixels().map(|pixel| pixel.0[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;
    use std::io::Cursor;

    fn png_bytes(img: &GrayImage) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img.clone())
            .write_to(&mut cursor, image::ImageFormat::Png)
            .expect("png encode");
        cursor.into_inner()
    }

    fn split_grid() -> GrayImage {
        // Top four rows bright, bottom four dark.
        GrayImage::from_fn(GRID_DIM, GRID_DIM, |_, y| {
            image::Luma([if y < GRID_DIM / 2 { 200 } else { 50 }])
        })
    }

    #[test]
    fn split_grid_has_known_bits() {
        let fp = fingerprint_image(&png_bytes(&split_grid())).expect("fingerprint");
        let expected = format!("{}{}", "1".repeat(32), "0".repeat(32));
        assert_eq!(fp.to_bit_string(), expected);
    }

    #[test]
    fn uniform_image_is_all_zeros() {
        // Every sample equals the mean, and the bit rule is strictly greater.
        let img = GrayImage::from_pixel(GRID_DIM, GRID_DIM, image::Luma([128]));
        let fp = fingerprint_image(&png_bytes(&img)).expect("fingerprint");
        assert_eq!(fp, Fingerprint::from_raw(0));
    }

    #[test]
    fn identical_bytes_give_identical_fingerprints() {
        let bytes = png_bytes(&split_grid());
        let first = fingerprint_image(&bytes).expect("first");
        let second = fingerprint_image(&bytes).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn larger_images_are_downsampled_deterministically() {
        let img = GrayImage::from_fn(64, 64, |x, y| image::Luma([((x + y) * 2) as u8]));
        let bytes = png_bytes(&img);
        let fp = fingerprint_image(&bytes).expect("fingerprint");
        assert_eq!(fp.to_bit_string().len(), FINGERPRINT_BITS);
        assert_eq!(fp, fingerprint_image(&bytes).expect("repeat"));
    }

    #[test]
    fn undecodable_bytes_are_a_decode_error() {
        let err = fingerprint_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, HashError::Decode(_)));
    }

    #[test]
    fn bit_string_round_trips() {
        let text = format!("{}{}", "10".repeat(16), "01".repeat(16));
        let fp = Fingerprint::from_bit_string(&text).expect("parse");
        assert_eq!(fp.to_bit_string(), text);
    }

    #[test]
    fn short_bit_strings_are_left_padded() {
        let fp = Fingerprint::from_bit_string("101").expect("parse");
        let text = fp.to_bit_string();
        assert_eq!(text.len(), FINGERPRINT_BITS);
        assert!(text.starts_with(&"0".repeat(61)));
        assert!(text.ends_with("101"));
    }

    #[test]
    fn overlong_bit_strings_are_rejected() {
        let err = Fingerprint::from_bit_string(&"1".repeat(65)).unwrap_err();
        assert!(matches!(
            err,
            HashError::FingerprintLength {
                expected: 64,
                actual: 65,
            }
        ));
    }

    #[test]
    fn non_binary_characters_are_rejected_with_position() {
        let err = Fingerprint::from_bit_string("0102").unwrap_err();
        assert!(matches!(err, HashError::FingerprintSyntax { position: 2 }));
    }

    #[test]
    fn from_bits_rejects_overlong_sequences() {
        let bits = vec![true; FINGERPRINT_BITS + 1];
        assert!(matches!(
            Fingerprint::from_bits(&bits),
            Err(HashError::FingerprintLength { .. })
        ));
    }

    #[test]
    fn serde_uses_the_bit_string_form() {
        let fp = Fingerprint::from_raw(0b1011);
        let json = serde_json::to_string(&fp).expect("serialize");
        assert_eq!(json, format!("\"{}\"", fp.to_bit_string()));
        let back: Fingerprint = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, fp);
    }
}
