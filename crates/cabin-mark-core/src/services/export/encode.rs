//! Artifact encoding.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::utils::error::ExportError;

pub const MIME_TYPE: &str = "image/jpeg";

/// Encode the finished surface as JPEG. The surface is consumed so its
/// pixels are freed as soon as encoding ends.
pub fn encode_jpeg(surface: RgbImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    surface.write_with_encoder(encoder).map_err(ExportError::Encode)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_encodes_decodable_jpeg() {
        let surface = RgbImage::from_pixel(64, 32, Rgb([200, 10, 10]));
        let bytes = encode_jpeg(surface, 85).unwrap();

        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn test_quality_changes_size() {
        let surface = RgbImage::from_fn(128, 128, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, ((x ^ y) * 2) as u8]));
        let high = encode_jpeg(surface.clone(), 95).unwrap();
        let low = encode_jpeg(surface, 20).unwrap();
        assert!(low.len() < high.len());
    }
}
