//! Drawing surface of the composite.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::utils::error::ExportError;

/// Largest edge the JPEG encoder accepts.
pub const MAX_EDGE: u32 = 65_535;

pub const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
pub const TITLE: Rgb<u8> = Rgb([0x0f, 0x17, 0x2a]);
pub const SUBTLE: Rgb<u8> = Rgb([0x64, 0x74, 0x8b]);
pub const LABEL: Rgb<u8> = Rgb([0x33, 0x41, 0x55]);
pub const HEADER_RULE: Rgb<u8> = Rgb([0xf1, 0xf5, 0xf9]);
pub const SEPARATOR: Rgb<u8> = Rgb([0xe2, 0xe8, 0xf0]);
pub const FOOTER: Rgb<u8> = Rgb([0xcb, 0xd5, 0xe1]);

/// Allocate a white surface of `width` x `height`.
pub fn allocate(width: u32, height: u32) -> Result<RgbImage, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::Surface(format!("empty surface {}x{}", width, height)));
    }
    if width > MAX_EDGE || height > MAX_EDGE {
        return Err(ExportError::Surface(format!(
            "surface {}x{} exceeds the {} pixel limit; export fewer photos",
            width, height, MAX_EDGE
        )));
    }
    Ok(RgbImage::from_pixel(width, height, WHITE))
}

/// Fill the rectangle at `(x, y)`, clipped to the surface.
pub fn fill_rect(surface: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(surface.width());
    let y_end = y.saturating_add(height).min(surface.height());
    for py in y..y_end {
        for px in x..x_end {
            surface.put_pixel(px, py, color);
        }
    }
}

/// Horizontal line from `x0` to `x1` centred on `y`.
pub fn hline(surface: &mut RgbImage, x0: u32, x1: u32, y: u32, thickness: u32, color: Rgb<u8>) {
    let top = y.saturating_sub(thickness / 2);
    fill_rect(surface, x0, top, x1.saturating_sub(x0), thickness, color);
}

/// Blend `color` into one pixel with `coverage` in 0..=255.
pub fn blend_pixel(surface: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: u8) {
    if coverage == 0 || x < 0 || y < 0 || x >= surface.width() as i64 || y >= surface.height() as i64 {
        return;
    }
    let pixel = surface.get_pixel_mut(x as u32, y as u32);
    let a = coverage as u32;
    for c in 0..3 {
        let bg = pixel.0[c] as u32;
        let fg = color.0[c] as u32;
        pixel.0[c] = ((fg * a + bg * (255 - a) + 127) / 255) as u8;
    }
}

/// Scale `photo` to `width` x `height` and draw it at `(x, y)`.
///
/// Only the scaled copy is converted to RGB; the full-resolution pixels
/// are never duplicated.
pub fn draw_scaled(surface: &mut RgbImage, photo: &DynamicImage, x: u32, y: u32, width: u32, height: u32) {
    let scaled = photo.resize_exact(width, height, FilterType::Triangle).into_rgb8();
    imageops::overlay(surface, &scaled, x as i64, y as i64);
}

/// Keep the top `height` rows of `surface`, reusing its buffer.
pub fn truncate_height(surface: RgbImage, height: u32) -> Result<RgbImage, ExportError> {
    let width = surface.width();
    if height >= surface.height() {
        return Ok(surface);
    }
    if height == 0 {
        return Err(ExportError::Surface(format!("empty surface {}x0", width)));
    }

    let mut raw = surface.into_raw();
    raw.truncate(width as usize * height as usize * 3);
    raw.shrink_to_fit();
    RgbImage::from_raw(width, height, raw)
        .ok_or_else(|| ExportError::Surface(format!("cannot shrink surface to {}x{}", width, height)))
}

/// Height of a photo of `src_width` x `src_height` scaled to `width`.
pub fn scaled_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    if src_width == 0 {
        return 0;
    }
    let h = (src_height as u64 * width as u64 + src_width as u64 / 2) / src_width as u64;
    h.clamp(1, MAX_EDGE as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_limits() {
        assert!(allocate(1600, 400).is_ok());
        assert!(matches!(allocate(0, 10), Err(ExportError::Surface(_))));
        assert!(matches!(allocate(1600, MAX_EDGE + 1), Err(ExportError::Surface(_))));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut surface = allocate(10, 10).unwrap();
        fill_rect(&mut surface, 8, 8, 5, 5, TITLE);
        assert_eq!(*surface.get_pixel(9, 9), TITLE);
        assert_eq!(*surface.get_pixel(7, 7), WHITE);
    }

    #[test]
    fn test_hline_thickness() {
        let mut surface = allocate(20, 20).unwrap();
        hline(&mut surface, 2, 18, 10, 4, SEPARATOR);
        assert_eq!(*surface.get_pixel(2, 8), SEPARATOR);
        assert_eq!(*surface.get_pixel(17, 11), SEPARATOR);
        assert_eq!(*surface.get_pixel(18, 10), WHITE);
        assert_eq!(*surface.get_pixel(5, 12), WHITE);
    }

    #[test]
    fn test_blend() {
        let mut surface = allocate(2, 1).unwrap();
        blend_pixel(&mut surface, 0, 0, Rgb([0, 0, 0]), 255);
        blend_pixel(&mut surface, 1, 0, Rgb([0, 0, 0]), 128);
        blend_pixel(&mut surface, -1, 0, Rgb([0, 0, 0]), 255);
        assert_eq!(*surface.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(surface.get_pixel(1, 0).0[0], 127);
    }

    #[test]
    fn test_draw_scaled_accepts_rgba_photos() {
        let mut surface = allocate(20, 20).unwrap();
        let photo = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(40, 40, image::Rgba([10, 200, 30, 255])));
        draw_scaled(&mut surface, &photo, 5, 5, 10, 10);

        assert_eq!(*surface.get_pixel(9, 9), Rgb([10, 200, 30]));
        assert_eq!(*surface.get_pixel(4, 4), WHITE);
        assert_eq!(*surface.get_pixel(15, 15), WHITE);
    }

    #[test]
    fn test_truncate_keeps_top_rows() {
        let mut surface = allocate(8, 10).unwrap();
        fill_rect(&mut surface, 0, 3, 8, 1, TITLE);
        fill_rect(&mut surface, 0, 8, 8, 1, SEPARATOR);

        let cut = truncate_height(surface, 6).unwrap();
        assert_eq!(cut.dimensions(), (8, 6));
        assert_eq!(*cut.get_pixel(7, 3), TITLE);
        assert!(cut.pixels().all(|p| *p != SEPARATOR));

        let same = truncate_height(allocate(4, 4).unwrap(), 9).unwrap();
        assert_eq!(same.dimensions(), (4, 4));
        assert!(matches!(truncate_height(allocate(4, 4).unwrap(), 0), Err(ExportError::Surface(_))));
    }

    #[test]
    fn test_scaled_height() {
        assert_eq!(scaled_height(4000, 3000, 1520), 1140);
        assert_eq!(scaled_height(3000, 4000, 1520), 2027);
        assert_eq!(scaled_height(10_000, 1, 1520), 1);
    }
}
