//! Cabin Auto-Mark core library
//!
//! Frontend-agnostic core of the cabin inspection photo tool: a
//! persistent photo store that keeps full-resolution images out of bulk
//! listings, and an export compositor that stitches the photos of one
//! aircraft into a single tall JPEG with bounded memory.
//!
//! # Architecture
//!
//! - `models`: photo records and projections, aircraft layouts, export
//!   requests and results, settings
//! - `db`: SQLite persistence with schema versioning
//! - `services`: `PhotoStore`, `ThumbnailProjector`, `ExportCompositor`,
//!   `SettingsManager`
//! - `events`: event emission abstraction (`EventSink`)
//! - `paths`: data directory resolution (`PathProvider`)
//! - `jobs`: cancellation and the single-export slot
//! - `utils`: errors and file-name helpers
//!
//! # Example
//!
//! ```no_run
//! use cabin_mark_core::{AppPathProvider, CabinMarkCore, LoggingEventSink, ExportOutcome};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let core = CabinMarkCore::open(Arc::new(AppPathProvider::new()), Arc::new(LoggingEventSink))?;
//!
//! let photo = core.store().capture("l1", "A320", std::fs::read("l1.jpg")?).await?;
//! println!("stored {}", photo.id);
//!
//! let spec = core.spec_for_scope("A320").await?;
//! if let ExportOutcome::Completed(artifact) = core.export(&spec).await? {
//!     std::fs::write(artifact.suggested_file_name(&spec), &artifact.bytes)?;
//! }
//! core.close();
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod events;
pub mod jobs;
pub mod models;
pub mod paths;
pub mod services;
pub mod utils;

pub use db::{Database, DatabaseStats};
pub use events::{EventSink, EventSinkExt, LoggingEventSink, NoOpEventSink, RecordingEventSink, SharedEventSink};
pub use jobs::{CancelToken, JobGuard, JobId, JobManager};
pub use models::{
    AircraftLayout, AppSettings, DoorPosition, ExportArtifact, ExportOutcome, ExportReport, ExportSpec,
    InspectionMetadata, LayoutCatalog, PhotoHeader, PhotoProjection, PhotoRecord, SkippedPhoto,
};
pub use paths::{AppPathProvider, PathProvider, SharedPathProvider};
pub use services::{ExportCompositor, GlyphSource, PhotoStore, SettingsManager, ThumbnailProjector};
pub use utils::{AppError, AppResult, CommandError, ExportError, StoreError, StoreResult};

use std::sync::Arc;

/// Application context shared by every host command.
///
/// Owns the store, the layout catalog and the export slot. Open one per
/// process and call [`close`](Self::close) before exiting.
pub struct CabinMarkCore {
    paths: SharedPathProvider,
    settings: AppSettings,
    layouts: Arc<LayoutCatalog>,
    store: Arc<PhotoStore>,
    compositor: ExportCompositor,
    jobs: Arc<JobManager>,
    events: SharedEventSink,
}

impl CabinMarkCore {
    /// Open the core with settings read from the provider's settings file.
    pub fn open(paths: SharedPathProvider, events: SharedEventSink) -> AppResult<Self> {
        let settings = SettingsManager::new(paths.as_ref())?.load_or_default();
        Self::with_settings(paths, settings, events)
    }

    /// Open the core with explicit settings.
    ///
    /// Fails only when a configured layout file cannot be loaded. An
    /// unopenable database leaves the store in its degraded state.
    pub fn with_settings(paths: SharedPathProvider, settings: AppSettings, events: SharedEventSink) -> AppResult<Self> {
        let layouts = Arc::new(LayoutCatalog::load_or_builtin(settings.layout_path.as_deref())?);
        let store = Arc::new(PhotoStore::open(paths.database_path(), &settings));
        let compositor = ExportCompositor::new(
            Arc::clone(&store),
            Arc::clone(&layouts),
            settings.export.clone(),
            Arc::clone(&events),
        );

        Ok(Self {
            paths,
            settings,
            layouts,
            store,
            compositor,
            jobs: Arc::new(JobManager::new()),
            events,
        })
    }

    pub fn store(&self) -> &Arc<PhotoStore> {
        &self.store
    }

    pub fn layouts(&self) -> &LayoutCatalog {
        &self.layouts
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn paths(&self) -> &SharedPathProvider {
        &self.paths
    }

    pub fn events(&self) -> &SharedEventSink {
        &self.events
    }

    pub fn jobs(&self) -> &Arc<JobManager> {
        &self.jobs
    }

    pub fn compositor(&self) -> &ExportCompositor {
        &self.compositor
    }

    /// Build an export request covering every photo of `aircraft_type`
    /// with the scope's saved inspection metadata.
    ///
    /// Fails with a store error when the database is closed, and with a
    /// precondition error when the scope has no photos or no
    /// registration / inspection label.
    pub async fn spec_for_scope(&self, aircraft_type: &str) -> Result<ExportSpec, ExportError> {
        if !self.store.is_available() {
            return Err(ExportError::Store(StoreError::Unavailable));
        }

        let meta = self.store.load_inspection(aircraft_type).await;
        let photo_ids = self.store.ids_for_scope(aircraft_type).await;

        let (registration, inspection_label) = meta
            .map(|m| (m.registration, m.inspection_label))
            .unwrap_or_default();

        let spec = ExportSpec {
            aircraft_id: aircraft_type.to_string(),
            registration,
            inspection_label,
            photo_ids,
        };
        spec.check_preconditions()?;
        Ok(spec)
    }

    /// Run an export in the process-wide export slot.
    ///
    /// Fails with [`ExportError::Busy`] while another export is running.
    pub async fn export(&self, spec: &ExportSpec) -> Result<ExportOutcome, ExportError> {
        let guard = self.jobs.try_start().ok_or(ExportError::Busy)?;
        let token = guard.token().clone();

        tracing::info!(
            job_id = token.job_id(),
            aircraft = %spec.aircraft_id,
            photos = spec.photo_ids.len(),
            "Export started"
        );
        self.compositor.export(spec, &token).await
    }

    /// Cancel the running export. Returns whether one was running.
    pub fn cancel_export(&self) -> bool {
        self.jobs.cancel_active()
    }

    /// Remove every photo and the inspection metadata of one aircraft.
    pub async fn clear_aircraft(&self, aircraft_type: &str) -> StoreResult<usize> {
        let deleted = self.store.delete_by_scope(aircraft_type).await?;
        self.store.clear_inspection(aircraft_type).await?;
        Ok(deleted)
    }

    /// Cancel any export and release the database.
    pub fn close(&self) {
        self.jobs.cancel_active();
        self.store.close();
    }
}
