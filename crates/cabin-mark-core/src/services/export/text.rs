//! Text rendering for titles, door labels and the footer.
//!
//! The default face is the 8x8 bitmap font from `font8x8`, scaled by an
//! integer factor, so exports render identically on every machine. A
//! TrueType/OpenType file can be configured instead for scripts the
//! bitmap font does not cover. Characters the active face cannot draw
//! are skipped.

use std::path::Path;

use font8x8::UnicodeFonts;
use image::{Rgb, RgbImage};

use crate::utils::error::{AppError, AppResult};

use super::surface::blend_pixel;

/// Source of glyphs for the compositor.
#[derive(Default)]
pub enum GlyphSource {
    #[default]
    Bitmap,
    Outline(Box<fontdue::Font>),
}

impl std::fmt::Debug for GlyphSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlyphSource::Bitmap => f.write_str("GlyphSource::Bitmap"),
            GlyphSource::Outline(_) => f.write_str("GlyphSource::Outline"),
        }
    }
}

impl GlyphSource {
    pub fn from_font_file(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path)?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| AppError::Config(format!("cannot load font {}: {}", path.display(), e)))?;
        Ok(GlyphSource::Outline(Box::new(font)))
    }

    /// The configured font, or the bitmap font when none is configured
    /// or the file cannot be loaded.
    pub fn from_optional_path(path: Option<&Path>) -> Self {
        match path {
            None => GlyphSource::Bitmap,
            Some(path) => Self::from_font_file(path).unwrap_or_else(|e| {
                tracing::warn!("Falling back to the bitmap font: {}", e);
                GlyphSource::Bitmap
            }),
        }
    }

    /// Advance width of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> u32 {
        match self {
            GlyphSource::Bitmap => {
                let scale = bitmap_scale(size);
                text.chars().filter(|c| bitmap_glyph(*c).is_some()).count() as u32 * 8 * scale
            }
            GlyphSource::Outline(font) => text
                .chars()
                .filter(|c| font.lookup_glyph_index(*c) != 0)
                .map(|c| font.metrics(c, size).advance_width)
                .sum::<f32>()
                .ceil() as u32,
        }
    }

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    pub fn draw(&self, surface: &mut RgbImage, text: &str, x: i64, baseline: i64, size: f32, color: Rgb<u8>) {
        match self {
            GlyphSource::Bitmap => draw_bitmap(surface, text, x, baseline, bitmap_scale(size), color),
            GlyphSource::Outline(font) => draw_outline(surface, font, text, x, baseline, size, color),
        }
    }
}

fn bitmap_scale(size: f32) -> u32 {
    ((size / 8.0).round() as u32).max(1)
}

fn bitmap_glyph(c: char) -> Option<[u8; 8]> {
    font8x8::BASIC_FONTS
        .get(c)
        .or_else(|| font8x8::LATIN_FONTS.get(c))
        .or_else(|| font8x8::GREEK_FONTS.get(c))
}

fn draw_bitmap(surface: &mut RgbImage, text: &str, x: i64, baseline: i64, scale: u32, color: Rgb<u8>) {
    let scale = scale as i64;
    // row 7 holds descenders
    let top = baseline - 7 * scale;
    let mut pen = x;

    for c in text.chars() {
        let Some(rows) = bitmap_glyph(c) else {
            continue;
        };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = pen + col as i64 * scale;
                let py = top + row as i64 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        blend_pixel(surface, px + dx, py + dy, color, 255);
                    }
                }
            }
        }
        pen += 8 * scale;
    }
}

fn draw_outline(
    surface: &mut RgbImage,
    font: &fontdue::Font,
    text: &str,
    x: i64,
    baseline: i64,
    size: f32,
    color: Rgb<u8>,
) {
    let mut pen = x as f32;

    for c in text.chars() {
        if font.lookup_glyph_index(c) == 0 {
            continue;
        }
        let (metrics, coverage) = font.rasterize(c, size);
        let left = pen.round() as i64 + metrics.xmin as i64;
        let top = baseline - (metrics.ymin as i64 + metrics.height as i64);

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let alpha = coverage[gy * metrics.width + gx];
                blend_pixel(surface, left + gx as i64, top + gy as i64, color, alpha);
            }
        }
        pen += metrics.advance_width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::export::surface::{allocate, TITLE, WHITE};

    #[test]
    fn test_bitmap_measure_scales_with_size() {
        let glyphs = GlyphSource::Bitmap;
        assert_eq!(glyphs.measure("L1", 8.0), 16);
        assert_eq!(glyphs.measure("L1", 40.0), 80);
        assert_eq!(glyphs.measure("", 40.0), 0);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let glyphs = GlyphSource::Bitmap;
        assert_eq!(glyphs.measure("A\u{4e00}B", 8.0), 16);
    }

    #[test]
    fn test_bitmap_draw_marks_pixels_inside_the_box() {
        let glyphs = GlyphSource::Bitmap;
        let mut surface = allocate(100, 40).unwrap();
        glyphs.draw(&mut surface, "H", 10, 30, 16.0, TITLE);

        let inked: Vec<_> = surface
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != WHITE)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, y)| (10..26).contains(&x) && (16..32).contains(&y)));
    }

    #[test]
    fn test_drawing_is_deterministic() {
        let glyphs = GlyphSource::Bitmap;
        let mut a = allocate(200, 50).unwrap();
        let mut b = allocate(200, 50).unwrap();
        glyphs.draw(&mut a, "B-30AB Arrival", 0, 40, 16.0, TITLE);
        glyphs.draw(&mut b, "B-30AB Arrival", 0, 40, 16.0, TITLE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_font_file_falls_back() {
        let glyphs = GlyphSource::from_optional_path(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(glyphs, GlyphSource::Bitmap));
    }
}
