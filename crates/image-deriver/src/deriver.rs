//! JPEG variant derivation

use crate::error::{DeriveError, Result};
use crate::{DEFAULT_JPEG_QUALITY, DERIVED_CONTENT_TYPE};
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

/// Whether objects of this content type get a derived variant
pub fn is_derivable(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// A derived representation ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedVariant {
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

/// Computes the derived representation of an original object
pub trait VariantDeriver: Send + Sync {
    /// Derive a variant from `data`.
    ///
    /// Returns `Ok(None)` when `content_type` is not eligible for derivation.
    fn derive(&self, data: &[u8], content_type: &str) -> Result<Option<DerivedVariant>>;
}

/// Re-encodes images as JPEG at a fixed quality
#[derive(Debug, Clone, Copy)]
pub struct JpegDeriver {
    quality: u8,
}

impl JpegDeriver {
    /// Create a deriver; quality is clamped to 1..=100
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl VariantDeriver for JpegDeriver {
    fn derive(&self, data: &[u8], content_type: &str) -> Result<Option<DerivedVariant>> {
        if !is_derivable(content_type) {
            return Ok(None);
        }

        let decoded =
            image::load_from_memory(data).map_err(|e| DeriveError::Decode(Box::new(e)))?;

        // JPEG has no alpha channel
        let rgb = decoded.to_rgb8();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(&rgb)
            .map_err(|e| DeriveError::Encode(Box::new(e)))?;

        debug!(
            content_type,
            width = rgb.width(),
            height = rgb.height(),
            original_size = data.len(),
            derived_size = out.len(),
            quality = self.quality,
            "Derived JPEG variant"
        );

        Ok(Some(DerivedVariant {
            data: out,
            content_type: DERIVED_CONTENT_TYPE,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_is_derivable() {
        assert!(is_derivable("image/png"));
        assert!(is_derivable("image/jpeg"));
        assert!(is_derivable("image/webp"));
        assert!(!is_derivable("text/plain"));
        assert!(!is_derivable("application/pdf"));
        assert!(!is_derivable("application/octet-stream"));
        assert!(!is_derivable(""));
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(JpegDeriver::new(0).quality(), 1);
        assert_eq!(JpegDeriver::new(255).quality(), 100);
        assert_eq!(JpegDeriver::default().quality(), 70);
    }

    #[test]
    fn test_derive_png_to_jpeg() {
        let input = png_bytes();
        let variant = JpegDeriver::default()
            .derive(&input, "image/png")
            .unwrap()
            .unwrap();

        assert_eq!(variant.content_type, "image/jpeg");
        assert_eq!(
            image::guess_format(&variant.data).unwrap(),
            ImageFormat::Jpeg
        );

        let decoded = image::load_from_memory(&variant.data).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 24);
    }

    #[test]
    fn test_derive_is_deterministic_and_leaves_input_untouched() {
        let input = png_bytes();
        let snapshot = input.clone();
        let deriver = JpegDeriver::default();

        let first = deriver.derive(&input, "image/png").unwrap().unwrap();
        let second = deriver.derive(&input, "image/png").unwrap().unwrap();

        assert_eq!(first.data, second.data);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_derive_image_with_alpha() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 100]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let variant = JpegDeriver::default()
            .derive(&buf, "image/png")
            .unwrap()
            .unwrap();
        assert_eq!(
            image::guess_format(&variant.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_non_image_is_not_derived() {
        let result = JpegDeriver::default()
            .derive(b"plain text", "text/plain")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_undecodable_image_fails() {
        let err = JpegDeriver::default()
            .derive(b"definitely not a png", "image/png")
            .unwrap_err();
        assert!(matches!(err, DeriveError::Decode(_)));
    }
}
