#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use cabin_mark_core::{
    AppSettings, ExportCompositor, ExportSpec, LayoutCatalog, NoOpEventSink, PhotoStore,
    SharedEventSink,
};
use image::{ImageFormat, Rgb, RgbImage};

/// Solid-colour JPEG of the given size.
pub fn solid_jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(width, height, Rgb(color)), ImageFormat::Jpeg)
}

/// Gradient PNG; survives re-encoding with recognisable structure.
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    encode(img, ImageFormat::Png)
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode test image");
    out.into_inner()
}

pub fn open_store(path: &Path) -> Arc<PhotoStore> {
    Arc::new(PhotoStore::open(path.join("photos.db"), &AppSettings::default()))
}

pub fn compositor(store: Arc<PhotoStore>) -> ExportCompositor {
    compositor_with_events(store, Arc::new(NoOpEventSink))
}

pub fn compositor_with_events(store: Arc<PhotoStore>, events: SharedEventSink) -> ExportCompositor {
    ExportCompositor::new(
        store,
        Arc::new(LayoutCatalog::builtin()),
        AppSettings::default().export,
        events,
    )
}

pub fn a320_spec(photo_ids: Vec<String>) -> ExportSpec {
    ExportSpec {
        aircraft_id: "A320".to_string(),
        registration: "B-30AB".to_string(),
        inspection_label: "Arrival".to_string(),
        photo_ids,
    }
}
