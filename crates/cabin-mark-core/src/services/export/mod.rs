//! Export compositor: stitches the selected photos of one aircraft into
//! a single tall JPEG.
//!
//! A run has four steps:
//!
//! 1. **Order** the photo headers by door position (see [`ordering`]).
//! 2. **Measure**: hydrate each photo in turn and read only its header
//!    dimensions. No pixels are decoded here. The sum of the measured
//!    slots bounds the surface height.
//! 3. **Draw**: allocate the surface once, then hydrate, decode, scale
//!    and draw one photo at a time, releasing it before the next. Each
//!    photo is placed at a running offset computed from the pixels that
//!    were actually decoded, so a skipped photo leaves no gap.
//! 4. **Encode**: cut the surface to the drawn content plus the footer,
//!    then encode it to JPEG.
//!
//! At most one full-resolution photo is decoded at any moment; the peak
//! is reported in [`ExportReport::peak_live_decodes`]. Cancellation is
//! checked before every hydrate. A photo that is missing or cannot be
//! decoded is skipped with a warning; the rest of the export continues.

pub mod decode;
pub mod encode;
pub mod ordering;
pub mod surface;
pub mod text;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbImage;

use crate::events::{
    EventSinkExt, ExportFinished, ExportProgress, ExportStage, SharedEventSink, EXPORT_FINISHED,
    EXPORT_PROGRESS,
};
use crate::jobs::CancelToken;
use crate::models::{
    AircraftLayout, ExportArtifact, ExportOutcome, ExportReport, ExportSettings, ExportSpec,
    LayoutCatalog, PhotoHeader, PhotoRecord, SkippedPhoto,
};
use crate::services::store::PhotoStore;
use crate::utils::error::ExportError;

use self::decode::{header_dimensions, DecodeTracker};
use self::text::GlyphSource;

pub use self::ordering::{order_by_position, order_headers};

const TITLE_SIZE: f32 = 80.0;
const BRANDING_SIZE: f32 = 32.0;
const LABEL_SIZE: f32 = 40.0;
const FOOTER_SIZE: f32 = 26.0;
const HEADER_BASELINE: i64 = 110;
const HEADER_RULE_Y: u32 = 160;
/// Label baseline below the bottom edge of its photo
const LABEL_OFFSET: i64 = 50;
/// Separator line below the bottom edge of a photo
const SEPARATOR_OFFSET: u32 = 90;
/// Footer text is centred this far above the bottom edge
const FOOTER_MID_FROM_BOTTOM: i64 = 40;

/// A measured photo. `height` comes from the image header and only
/// bounds the surface; the drawn height is taken from the decoded pixels.
#[derive(Debug, Clone)]
struct Slot {
    header: PhotoHeader,
    label: String,
    height: u32,
}

/// Where the draw pass puts the next photo.
#[derive(Debug, Clone, Copy)]
struct Placement {
    x: u32,
    y: u32,
    width: u32,
    label_height: u32,
    gap: u32,
    /// Rows kept free for the footer
    reserved_bottom: u32,
}

/// Composes export artifacts from the photo store.
///
/// The compositor does not guard against concurrent runs; use
/// [`CabinMarkCore::export`](crate::CabinMarkCore::export) for the
/// single-export rule.
#[derive(Clone)]
pub struct ExportCompositor {
    store: Arc<PhotoStore>,
    layouts: Arc<LayoutCatalog>,
    settings: ExportSettings,
    glyphs: Arc<GlyphSource>,
    events: SharedEventSink,
}

impl std::fmt::Debug for ExportCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportCompositor")
            .field("settings", &self.settings)
            .field("glyphs", &self.glyphs)
            .finish_non_exhaustive()
    }
}

impl ExportCompositor {
    /// Build a compositor. Labels use the font named by
    /// `settings.font_path`, or the built-in bitmap font.
    pub fn new(
        store: Arc<PhotoStore>,
        layouts: Arc<LayoutCatalog>,
        settings: ExportSettings,
        events: SharedEventSink,
    ) -> Self {
        let glyphs = GlyphSource::from_optional_path(settings.font_path.as_deref());
        Self {
            store,
            layouts,
            settings,
            glyphs: Arc::new(glyphs),
            events,
        }
    }

    pub fn with_glyphs(mut self, glyphs: GlyphSource) -> Self {
        self.glyphs = Arc::new(glyphs);
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Compose `spec` stamped with the current time.
    pub async fn export(&self, spec: &ExportSpec, cancel: &CancelToken) -> Result<ExportOutcome, ExportError> {
        self.export_at(spec, Utc::now(), cancel).await
    }

    /// Compose `spec` stamped with `produced_at`.
    ///
    /// Two runs over the same store contents, spec and `produced_at`
    /// yield identical bytes.
    pub async fn export_at(
        &self,
        spec: &ExportSpec,
        produced_at: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> Result<ExportOutcome, ExportError> {
        let started = std::time::Instant::now();
        let result = self.run(spec, produced_at, cancel).await;

        let finished = match &result {
            Ok(ExportOutcome::Completed(artifact)) => {
                tracing::info!(
                    aircraft = %spec.aircraft_id,
                    drawn = artifact.report.drawn,
                    skipped = artifact.report.skipped.len(),
                    width = artifact.report.width,
                    height = artifact.report.height,
                    bytes = artifact.bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Export completed"
                );
                ExportFinished {
                    job_id: cancel.job_id(),
                    status: "completed",
                    drawn: artifact.report.drawn,
                    skipped: artifact.report.skipped.len(),
                    error_code: None,
                }
            }
            Ok(ExportOutcome::Cancelled) => {
                tracing::info!(aircraft = %spec.aircraft_id, "Export cancelled");
                ExportFinished {
                    job_id: cancel.job_id(),
                    status: "cancelled",
                    drawn: 0,
                    skipped: 0,
                    error_code: None,
                }
            }
            Err(e) => {
                tracing::error!(aircraft = %spec.aircraft_id, code = e.code(), "Export failed: {}", e);
                ExportFinished {
                    job_id: cancel.job_id(),
                    status: "failed",
                    drawn: 0,
                    skipped: 0,
                    error_code: Some(e.code()),
                }
            }
        };
        self.events.emit_typed(EXPORT_FINISHED, &finished);

        result
    }

    async fn run(
        &self,
        spec: &ExportSpec,
        produced_at: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> Result<ExportOutcome, ExportError> {
        spec.check_preconditions()?;

        let mut report = ExportReport::default();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut ids = Vec::with_capacity(spec.photo_ids.len());
        for id in &spec.photo_ids {
            if seen.insert(id.as_str()) {
                ids.push(id.clone());
            }
        }

        let headers = self.store.load_headers(&ids).await?;
        let found: HashSet<&str> = headers.iter().map(|h| h.id.as_str()).collect();
        for id in ids.iter().filter(|id| !found.contains(id.as_str())) {
            skip(&mut report, id, "photo not found");
        }

        let layout = self.layouts.aircraft(&spec.aircraft_id);
        if layout.is_none() {
            tracing::warn!(aircraft = %spec.aircraft_id, "No layout for aircraft, keeping selection order");
        }
        let ordered = order_headers(headers, layout, self.settings.row_epsilon);

        let Some(slots) = self.measure(ordered, layout, &mut report, cancel).await? else {
            return Ok(ExportOutcome::Cancelled);
        };
        if slots.is_empty() {
            return Err(ExportError::Precondition(
                "none of the selected photos could be loaded".to_string(),
            ));
        }

        let width = self.settings.canvas_width;
        let bound = slots
            .iter()
            .fold(self.settings.header_height, |y, slot| {
                y.saturating_add(slot.height)
                    .saturating_add(self.settings.label_height)
                    .saturating_add(self.settings.gap)
            })
            .saturating_add(self.settings.footer_height);

        let mut surface = surface::allocate(width, bound)?;
        self.draw_header(&mut surface, spec);

        let tracker = DecodeTracker::new();
        let Some((surface, content_end)) = self.draw_photos(surface, &slots, &tracker, &mut report, cancel).await?
        else {
            return Ok(ExportOutcome::Cancelled);
        };
        if report.drawn == 0 {
            return Err(ExportError::Precondition(
                "none of the selected photos could be loaded".to_string(),
            ));
        }

        let height = content_end.saturating_add(self.settings.footer_height);
        let mut surface = surface::truncate_height(surface, height)?;
        self.draw_footer(&mut surface, produced_at);

        if cancel.is_cancelled() {
            return Ok(ExportOutcome::Cancelled);
        }
        self.progress(cancel, ExportStage::Encoding, 0, 1);

        let quality = self.settings.jpeg_quality;
        let bytes = tokio::task::spawn_blocking(move || encode::encode_jpeg(surface, quality))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))??;
        self.progress(cancel, ExportStage::Encoding, 1, 1);

        report.peak_live_decodes = tracker.peak();
        report.width = width;
        report.height = height;

        Ok(ExportOutcome::Completed(ExportArtifact {
            bytes,
            mime_type: encode::MIME_TYPE,
            produced_at,
            report,
        }))
    }

    /// Measure every photo. Returns `None` when cancelled.
    async fn measure(
        &self,
        ordered: Vec<PhotoHeader>,
        layout: Option<&AircraftLayout>,
        report: &mut ExportReport,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<Slot>>, ExportError> {
        let content_width = self.content_width()?;
        let total = ordered.len();
        let mut slots = Vec::with_capacity(total);

        for (i, header) in ordered.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let Some(record) = self.store.get_full(&header.id).await else {
                skip(report, &header.id, "photo disappeared before export");
                continue;
            };

            match header_dimensions(&record.full_image) {
                Ok((w, h)) if w > 0 && h > 0 => {
                    let height = surface::scaled_height(w, h, content_width);
                    let label = match layout {
                        Some(layout) => layout.door_label(&header.door_id).to_string(),
                        None => header.door_id.clone(),
                    };
                    slots.push(Slot { header, label, height });
                }
                Ok(_) => skip(report, &header.id, "image has no pixels"),
                Err(e) => skip(report, &header.id, &format!("unreadable image: {}", e)),
            }
            drop(record);

            self.progress(cancel, ExportStage::Measuring, i + 1, total);
            self.maybe_yield(i).await;
        }

        Ok(Some(slots))
    }

    /// Draw every slot, one decoded photo at a time. Returns the surface
    /// and the row where the drawn content ends, or `None` when
    /// cancelled; the surface is dropped in that case.
    async fn draw_photos(
        &self,
        mut surface: RgbImage,
        slots: &[Slot],
        tracker: &DecodeTracker,
        report: &mut ExportReport,
        cancel: &CancelToken,
    ) -> Result<Option<(RgbImage, u32)>, ExportError> {
        let mut placement = Placement {
            x: self.settings.padding,
            y: self.settings.header_height,
            width: self.content_width()?,
            label_height: self.settings.label_height,
            gap: self.settings.gap,
            reserved_bottom: self.settings.footer_height,
        };
        // Drawn lazily so the last photo on the surface has none.
        let mut separator_y: Option<u32> = None;

        for (i, slot) in slots.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let Some(record) = self.store.get_full(&slot.header.id).await else {
                skip(report, &slot.header.id, "photo disappeared during export");
                continue;
            };

            let tracker = tracker.clone();
            let glyphs = Arc::clone(&self.glyphs);
            let label = slot.label.clone();

            let (returned, drawn) = tokio::task::spawn_blocking(move || {
                let mut surface = surface;
                let drawn = draw_one(&mut surface, &tracker, &glyphs, record, &label, placement, separator_y);
                (surface, drawn)
            })
            .await
            .map_err(|e| ExportError::Task(e.to_string()))?;
            surface = returned;

            match drawn {
                Ok(height) => {
                    report.drawn += 1;
                    separator_y = Some(placement.y.saturating_add(height).saturating_add(SEPARATOR_OFFSET));
                    placement.y = placement
                        .y
                        .saturating_add(height)
                        .saturating_add(placement.label_height)
                        .saturating_add(placement.gap);
                }
                Err(reason) => skip(report, &slot.header.id, &reason),
            }

            self.progress(cancel, ExportStage::Drawing, i + 1, slots.len());
            self.maybe_yield(i).await;
        }

        Ok(Some((surface, placement.y)))
    }

    fn draw_header(&self, surface: &mut RgbImage, spec: &ExportSpec) {
        let padding = self.settings.padding;
        let width = self.settings.canvas_width;

        self.glyphs.draw(surface, &spec.title(), padding as i64, HEADER_BASELINE, TITLE_SIZE, surface::TITLE);

        let branding = &self.settings.branding;
        let branding_width = self.glyphs.measure(branding, BRANDING_SIZE);
        let x = width.saturating_sub(padding).saturating_sub(branding_width);
        self.glyphs.draw(surface, branding, x as i64, HEADER_BASELINE, BRANDING_SIZE, surface::SUBTLE);

        surface::hline(surface, padding, width.saturating_sub(padding), HEADER_RULE_Y, 4, surface::HEADER_RULE);
    }

    fn draw_footer(&self, surface: &mut RgbImage, produced_at: DateTime<Utc>) {
        let text = format!(
            "{} | Exported: {}",
            self.settings.branding,
            produced_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let text_width = self.glyphs.measure(&text, FOOTER_SIZE) as i64;
        let x = (surface.width() as i64 - text_width) / 2;
        let middle = surface.height() as i64 - FOOTER_MID_FROM_BOTTOM;
        let baseline = middle + (FOOTER_SIZE * 0.35) as i64;

        self.glyphs.draw(surface, &text, x, baseline, FOOTER_SIZE, surface::FOOTER);
    }

    fn content_width(&self) -> Result<u32, ExportError> {
        let width = self
            .settings
            .canvas_width
            .checked_sub(self.settings.padding.saturating_mul(2))
            .unwrap_or(0);
        if width == 0 {
            return Err(ExportError::Surface(format!(
                "padding {} leaves no room on a {} pixel canvas",
                self.settings.padding, self.settings.canvas_width
            )));
        }
        Ok(width)
    }

    fn progress(&self, cancel: &CancelToken, stage: ExportStage, current: usize, total: usize) {
        tracing::debug!(?stage, current, total, "Export progress");
        self.events.emit_typed(
            EXPORT_PROGRESS,
            &ExportProgress {
                job_id: cancel.job_id(),
                stage,
                current,
                total,
            },
        );
    }

    async fn maybe_yield(&self, index: usize) {
        let every = self.settings.yield_every;
        if every > 0 && (index + 1) % every == 0 {
            tokio::task::yield_now().await;
        }
    }
}

/// Decode `record` and draw it with its label at `at`, after the
/// pending separator of the previous photo. Returns the drawn height.
fn draw_one(
    surface: &mut RgbImage,
    tracker: &DecodeTracker,
    glyphs: &GlyphSource,
    record: PhotoRecord,
    label: &str,
    at: Placement,
    separator_y: Option<u32>,
) -> Result<u32, String> {
    let decoded = tracker
        .decode(&record.full_image)
        .map_err(|e| format!("decode failed: {}", e))?;
    drop(record);

    let (src_width, src_height) = (decoded.image().width(), decoded.image().height());
    if src_width == 0 || src_height == 0 {
        return Err("image has no pixels".to_string());
    }
    let height = surface::scaled_height(src_width, src_height, at.width);

    let needed = at
        .y
        .saturating_add(height)
        .saturating_add(at.label_height)
        .saturating_add(at.gap)
        .saturating_add(at.reserved_bottom);
    if needed > surface.height() {
        return Err("photo changed during export".to_string());
    }

    if let Some(line_y) = separator_y {
        let right = surface.width().saturating_sub(at.x);
        surface::hline(surface, at.x, right, line_y, 2, surface::SEPARATOR);
    }

    surface::draw_scaled(surface, decoded.image(), at.x, at.y, at.width, height);
    drop(decoded);

    let baseline = at.y as i64 + height as i64 + LABEL_OFFSET;
    glyphs.draw(surface, label, at.x as i64, baseline, LABEL_SIZE, surface::LABEL);

    Ok(height)
}

fn skip(report: &mut ExportReport, id: &str, reason: &str) {
    tracing::warn!(photo_id = id, reason, "Skipping photo in export");
    report.skipped.push(SkippedPhoto {
        id: id.to_string(),
        reason: reason.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::events::{NoOpEventSink, RecordingEventSink};
    use crate::services::thumbnail::ThumbnailProjector;
    use chrono::TimeZone;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn jpeg(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, Rgb([shade, 40, 200 - shade / 2]))
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    fn store() -> Arc<PhotoStore> {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        Arc::new(PhotoStore::with_database(db, ThumbnailProjector::default()))
    }

    fn compositor(store: Arc<PhotoStore>) -> ExportCompositor {
        ExportCompositor::new(
            store,
            Arc::new(LayoutCatalog::builtin()),
            ExportSettings::default(),
            Arc::new(NoOpEventSink),
        )
    }

    fn spec(ids: Vec<String>) -> ExportSpec {
        ExportSpec {
            aircraft_id: "A320".to_string(),
            registration: "B-30AB".to_string(),
            inspection_label: "Arrival".to_string(),
            photo_ids: ids,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_layout_dimensions() {
        let store = store();
        let a = store.capture("l1", "A320", jpeg(400, 300, 10)).await.unwrap();
        let b = store.capture("r1", "A320", jpeg(300, 400, 90)).await.unwrap();

        let outcome = compositor(store)
            .export_at(&spec(vec![a.id, b.id]), at(), &CancelToken::detached())
            .await
            .unwrap();
        let artifact = outcome.artifact().unwrap();

        // 200 header + (1140 + 60 + 40) + (2027 + 60 + 40) + 100 footer
        assert_eq!(artifact.report.width, 1600);
        assert_eq!(artifact.report.height, 200 + 1240 + 2127 + 100);
        assert_eq!(artifact.report.drawn, 2);
        assert_eq!(artifact.report.peak_live_decodes, 1);
        assert_eq!(artifact.mime_type, "image/jpeg");

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1600, 3667));
    }

    #[tokio::test]
    async fn test_preconditions_fail_before_store_access() {
        let store = Arc::new(PhotoStore::unavailable(ThumbnailProjector::default()));
        let compositor = compositor(store);

        let err = compositor
            .export_at(&spec(vec![]), at(), &CancelToken::detached())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Precondition(_)));

        let mut missing_label = spec(vec!["p-1".to_string()]);
        missing_label.inspection_label = "  ".to_string();
        let err = compositor
            .export_at(&missing_label, at(), &CancelToken::detached())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store_is_a_store_error() {
        let store = Arc::new(PhotoStore::unavailable(ThumbnailProjector::default()));
        let err = compositor(store)
            .export_at(&spec(vec!["p-1".to_string()]), at(), &CancelToken::detached())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_STORE");
    }

    #[tokio::test]
    async fn test_undecodable_photo_is_skipped() {
        let store = store();
        let good = store.capture("l1", "A320", jpeg(200, 100, 30)).await.unwrap();
        let bad = store.capture("r1", "A320", b"corrupt".to_vec()).await.unwrap();

        let artifact = compositor(store)
            .export_at(&spec(vec![good.id.clone(), bad.id.clone()]), at(), &CancelToken::detached())
            .await
            .unwrap()
            .artifact()
            .unwrap();

        assert_eq!(artifact.report.drawn, 1);
        assert_eq!(artifact.report.skipped.len(), 1);
        assert_eq!(artifact.report.skipped[0].id, bad.id);
    }

    /// PNG whose header is intact but whose compressed pixel data is not.
    fn png_with_corrupt_body(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7 + y * 13) as u8, (x * y) as u8, (y * 3) as u8]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        let mut bytes = out.into_inner();

        let idat = bytes.windows(4).position(|w| w == b"IDAT").unwrap();
        let end = (idat + 64).min(bytes.len() - 12);
        for byte in &mut bytes[idat + 6..end] {
            *byte = 0xFF;
        }
        bytes
    }

    #[tokio::test]
    async fn test_photo_failing_to_decode_leaves_no_gap() {
        let store = store();
        let good = store.capture("l1", "A320", jpeg(400, 300, 30)).await.unwrap();
        let corrupt = png_with_corrupt_body(400, 300);
        assert_eq!(header_dimensions(&corrupt).unwrap(), (400, 300));
        assert!(image::load_from_memory(&corrupt).is_err());
        let broken = store.capture("r1", "A320", corrupt).await.unwrap();

        let artifact = compositor(store)
            .export_at(&spec(vec![broken.id.clone(), good.id.clone()]), at(), &CancelToken::detached())
            .await
            .unwrap()
            .artifact()
            .unwrap();

        assert_eq!(artifact.report.drawn, 1);
        assert_eq!(artifact.report.skipped.len(), 1);
        assert_eq!(artifact.report.skipped[0].id, broken.id);
        assert!(artifact.report.skipped[0].reason.contains("decode failed"));

        // 200 header + (1140 + 60 + 40) + 100 footer, nothing reserved for the broken photo
        assert_eq!(artifact.report.height, 1540);
        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1600, 1540));
    }

    #[tokio::test]
    async fn test_oversized_settings_fail_without_overflow() {
        let store = store();
        let photo = store.capture("l1", "A320", jpeg(64, 64, 0)).await.unwrap();
        let settings = ExportSettings {
            label_height: u32::MAX,
            gap: u32::MAX,
            ..ExportSettings::default()
        };
        let compositor = ExportCompositor::new(store, Arc::new(LayoutCatalog::builtin()), settings, Arc::new(NoOpEventSink));

        let err = compositor
            .export_at(&spec(vec![photo.id]), at(), &CancelToken::detached())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_SURFACE");
    }

    #[tokio::test]
    async fn test_nothing_loadable_is_a_precondition_error() {
        let err = compositor(store())
            .export_at(&spec(vec!["ghost".to_string()]), at(), &CancelToken::detached())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let store = store();
        let photo = store.capture("l1", "A320", jpeg(64, 64, 0)).await.unwrap();
        let cancel = CancelToken::detached();
        cancel.cancel();

        let outcome = compositor(store).export_at(&spec(vec![photo.id]), at(), &cancel).await.unwrap();
        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_emits_progress_and_finished_events() {
        let store = store();
        let photo = store.capture("l1", "A320", jpeg(64, 64, 0)).await.unwrap();
        let sink = Arc::new(RecordingEventSink::new());
        let compositor = ExportCompositor::new(
            store,
            Arc::new(LayoutCatalog::builtin()),
            ExportSettings::default(),
            sink.clone(),
        );

        compositor
            .export_at(&spec(vec![photo.id]), at(), &CancelToken::detached())
            .await
            .unwrap();

        let names = sink.names();
        assert_eq!(names.last().map(String::as_str), Some(EXPORT_FINISHED));
        assert_eq!(names.iter().filter(|n| *n == EXPORT_PROGRESS).count(), 4);
        let (_, finished) = sink.events().pop().unwrap();
        assert!(finished.contains("\"status\":\"completed\""));
    }
}
