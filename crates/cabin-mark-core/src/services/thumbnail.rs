//! Thumbnail projection.
//!
//! Derives the lightweight image shown in listings from a full-resolution
//! photo. The projection is a pure function of the input bytes and the
//! configured edge/quality, so backfilling twice yields identical bytes.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::models::ThumbnailSettings;
use crate::utils::error::AppResult;

/// Downscales and recompresses full images into thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailProjector {
    max_edge: u32,
    quality: u8,
}

impl Default for ThumbnailProjector {
    fn default() -> Self {
        Self::new(&ThumbnailSettings::default())
    }
}

impl ThumbnailProjector {
    pub fn new(settings: &ThumbnailSettings) -> Self {
        Self {
            max_edge: settings.max_edge.max(1),
            quality: settings.quality.clamp(1, 100),
        }
    }

    pub fn max_edge(&self) -> u32 {
        self.max_edge
    }

    /// Project `full_image` into a JPEG thumbnail whose longer edge is at
    /// most `max_edge`.
    ///
    /// Returns an empty vector when the input cannot be decoded or the
    /// thumbnail cannot be encoded. It never returns the input bytes.
    pub fn project(&self, full_image: &[u8]) -> Vec<u8> {
        match self.try_project(full_image) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(input_len = full_image.len(), "Thumbnail projection failed: {}", e);
                Vec::new()
            }
        }
    }

    fn try_project(&self, full_image: &[u8]) -> AppResult<Vec<u8>> {
        let img = image::load_from_memory(full_image)?;
        let thumbnail = self.downscale(img);

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        thumbnail.to_rgb8().write_with_encoder(encoder)?;
        Ok(out)
    }

    /// Shrink so the longer edge fits `max_edge`; smaller images are kept
    /// at their size.
    fn downscale(&self, img: DynamicImage) -> DynamicImage {
        if img.width().max(img.height()) <= self.max_edge {
            return img;
        }
        img.resize(self.max_edge, self.max_edge, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn dims(bytes: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_landscape_is_fitted_to_long_edge() {
        let projector = ThumbnailProjector::default();
        let thumb = projector.project(&encoded(1000, 500, ImageFormat::Png));
        assert_eq!(dims(&thumb), (250, 125));
    }

    #[test]
    fn test_portrait_is_fitted_to_long_edge() {
        let projector = ThumbnailProjector::default();
        let thumb = projector.project(&encoded(400, 800, ImageFormat::Jpeg));
        assert_eq!(dims(&thumb), (125, 250));
    }

    #[test]
    fn test_small_image_keeps_size() {
        let projector = ThumbnailProjector::default();
        let thumb = projector.project(&encoded(120, 80, ImageFormat::Png));
        assert_eq!(dims(&thumb), (120, 80));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let projector = ThumbnailProjector::default();
        let input = encoded(640, 480, ImageFormat::Jpeg);
        assert_eq!(projector.project(&input), projector.project(&input));
    }

    #[test]
    fn test_undecodable_input_yields_empty() {
        let projector = ThumbnailProjector::default();
        let garbage = vec![0x42; 4096];
        let thumb = projector.project(&garbage);
        assert!(thumb.is_empty());
        assert!(projector.project(&[]).is_empty());
    }

    #[test]
    fn test_settings_are_clamped() {
        let projector = ThumbnailProjector::new(&ThumbnailSettings {
            max_edge: 0,
            quality: 0,
        });
        assert_eq!(projector.max_edge(), 1);
        assert!(!projector.project(&encoded(10, 10, ImageFormat::Png)).is_empty());
    }
}
