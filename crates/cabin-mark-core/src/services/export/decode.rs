//! Full-resolution decoding with a live-count bound.
//!
//! Every decoded image the compositor holds is a [`DecodedImage`]. The
//! handle counts itself in a shared tracker while alive, which makes
//! the "at most one decoded photo at a time" rule observable.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageReader, ImageResult};

/// Counts live decodes and remembers the highest count seen.
#[derive(Debug, Clone, Default)]
pub struct DecodeTracker {
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl DecodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` into a tracked image.
    pub fn decode(&self, bytes: &[u8]) -> ImageResult<DecodedImage> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()?;

        let now = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);

        Ok(DecodedImage {
            image,
            live: Arc::clone(&self.live),
        })
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

/// A decoded photo. Dropping it releases its pixels and its slot in the
/// tracker.
pub struct DecodedImage {
    image: DynamicImage,
    live: Arc<AtomicUsize>,
}

impl DecodedImage {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

impl Drop for DecodedImage {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Read width and height from the image header without decoding pixels.
pub fn header_dimensions(bytes: &[u8]) -> ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, Rgb([10, 20, 30]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_dimensions_come_from_header_only() {
        assert_eq!(header_dimensions(&png(321, 123)).unwrap(), (321, 123));
        assert!(header_dimensions(b"not an image").is_err());
    }

    #[test]
    fn test_tracker_counts_live_handles() {
        let tracker = DecodeTracker::new();
        let bytes = png(16, 8);

        let first = tracker.decode(&bytes).unwrap();
        assert_eq!(first.dimensions(), (16, 8));
        assert_eq!(tracker.live(), 1);
        drop(first);
        assert_eq!(tracker.live(), 0);

        let a = tracker.decode(&bytes).unwrap();
        let b = tracker.decode(&bytes).unwrap();
        assert_eq!(tracker.peak(), 2);
        drop((a, b));
        assert_eq!(tracker.live(), 0);
    }

    #[test]
    fn test_failed_decode_is_not_counted() {
        let tracker = DecodeTracker::new();
        assert!(tracker.decode(&[0u8; 32]).is_err());
        assert_eq!(tracker.peak(), 0);
    }
}
