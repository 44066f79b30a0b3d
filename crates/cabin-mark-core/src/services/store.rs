//! Persistent photo store.
//!
//! `PhotoStore` is the only way the rest of the crate touches photo
//! rows. It keeps two promises:
//!
//! - Bulk reads return [`PhotoProjection`]s, which have no full-image
//!   field. Full images leave the database one at a time through
//!   [`PhotoStore::get_full`].
//! - Reads never fail. When the database cannot be opened (or a query
//!   fails) they log and return empty results. Writes log and return a
//!   [`StoreError`].
//!
//! Every operation runs on the blocking pool over a cloned [`Database`]
//! handle. Operations on different ids may run concurrently; operations
//! on the same id are ordered only by SQLite commit order. There is no
//! per-id lock: the store has a single writer in practice.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::db::{Database, DatabaseStats};
use crate::models::{
    now_iso8601, AppSettings, InspectionMetadata, PhotoHeader, PhotoProjection, PhotoRecord,
};
use crate::services::thumbnail::ThumbnailProjector;
use crate::utils::error::{AppResult, StoreError, StoreResult};

/// Handle to the photo database.
///
/// Create one per process with [`PhotoStore::open`], share it behind an
/// `Arc`, and [`close`](PhotoStore::close) it on shutdown.
#[derive(Debug)]
pub struct PhotoStore {
    db: RwLock<Option<Database>>,
    projector: ThumbnailProjector,
    backfill_writes: Arc<AtomicU64>,
}

impl PhotoStore {
    /// Open (or create) the database at `path`.
    ///
    /// Never fails: if the database cannot be opened the store starts in
    /// the unavailable state, logs the cause, and serves empty reads.
    pub fn open(path: PathBuf, settings: &AppSettings) -> Self {
        let projector = ThumbnailProjector::new(&settings.thumbnail);

        let opened = Database::open(path.clone(), settings.storage.enable_wal)
            .and_then(|db| db.init().map(|_| db));

        match opened {
            Ok(db) => {
                tracing::info!(path = %path.display(), "Photo store opened");
                Self::with_database(db, projector)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "Photo store unavailable: {}", e);
                Self::unavailable(projector)
            }
        }
    }

    /// Wrap an already initialised database.
    pub fn with_database(db: Database, projector: ThumbnailProjector) -> Self {
        Self {
            db: RwLock::new(Some(db)),
            projector,
            backfill_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A store with no database behind it.
    pub fn unavailable(projector: ThumbnailProjector) -> Self {
        Self {
            db: RwLock::new(None),
            projector,
            backfill_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Release the database. Later reads return empty results and later
    /// writes fail with [`StoreError::Unavailable`].
    pub fn close(&self) {
        if let Ok(mut guard) = self.db.write() {
            if guard.take().is_some() {
                tracing::info!("Photo store closed");
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.db.read().map(|g| g.is_some()).unwrap_or(false)
    }

    pub fn projector(&self) -> ThumbnailProjector {
        self.projector
    }

    /// Number of thumbnails persisted by backfill since the store opened.
    pub fn backfill_write_count(&self) -> u64 {
        self.backfill_writes.load(Ordering::Relaxed)
    }

    fn handle(&self) -> Option<Database> {
        self.db.read().ok().and_then(|g| g.clone())
    }

    async fn run_blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(Database) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.handle().ok_or(StoreError::Unavailable)?;

        tokio::task::spawn_blocking(move || f(db))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
            .map_err(StoreError::from)
    }

    fn degrade<T: Default>(op: &str, result: StoreResult<T>) -> T {
        result.unwrap_or_else(|e| {
            tracing::warn!(op, "Photo store read failed, returning empty result: {}", e);
            T::default()
        })
    }

    fn report<T>(op: &str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(e) = &result {
            tracing::error!(op, "Photo store write failed: {}", e);
        }
        result
    }

    // ==================== Reads ====================

    /// Every photo as a thumbnail projection.
    ///
    /// Read with backfill: rows stored without a thumbnail get one
    /// computed from their full image, persisted, and merged into the
    /// result. Each row is backfilled at most once; a second call finds
    /// the stored thumbnail and writes nothing. Rows whose image cannot
    /// be decoded get an empty thumbnail persisted for the same reason.
    pub async fn load_all_projections(&self) -> Vec<PhotoProjection> {
        self.load_projections(None).await
    }

    /// Same as [`load_all_projections`](Self::load_all_projections), for
    /// one aircraft scope.
    pub async fn load_projections_for_scope(&self, aircraft_type: &str) -> Vec<PhotoProjection> {
        self.load_projections(Some(aircraft_type.to_string())).await
    }

    async fn load_projections(&self, scope: Option<String>) -> Vec<PhotoProjection> {
        let projector = self.projector;
        let writes = Arc::clone(&self.backfill_writes);

        let result = self
            .run_blocking(move |db| load_with_backfill(&db, projector, scope.as_deref(), &writes))
            .await;

        Self::degrade("load_projections", result)
    }

    /// The complete record including the full image, or `None` when the
    /// id is unknown (or the store is unavailable).
    pub async fn get_full(&self, id: &str) -> Option<PhotoRecord> {
        let id = id.to_string();
        let result = self.run_blocking(move |db| db.get_photo(&id)).await;
        Self::degrade("get_full", result)
    }

    /// Image-free headers for `ids`, in request order. Unknown ids are
    /// left out.
    ///
    /// Unlike the listing reads this reports failures, so an export can
    /// tell "no such photos" apart from "store is down".
    pub async fn load_headers(&self, ids: &[String]) -> StoreResult<Vec<PhotoHeader>> {
        let ids = ids.to_vec();
        self.run_blocking(move |db| db.get_photo_headers(&ids)).await
    }

    /// Ids of one aircraft scope, oldest first.
    pub async fn ids_for_scope(&self, aircraft_type: &str) -> Vec<String> {
        let scope = aircraft_type.to_string();
        let result = self.run_blocking(move |db| db.photo_ids_for_scope(&scope)).await;
        Self::degrade("ids_for_scope", result)
    }

    /// Photo count per aircraft scope.
    pub async fn count_by_scope(&self) -> BTreeMap<String, i64> {
        let result = self.run_blocking(|db| db.count_photos_by_scope()).await;
        Self::degrade("count_by_scope", result)
    }

    pub async fn stats(&self) -> Option<DatabaseStats> {
        let result = self.run_blocking(|db| db.stats().map(Some)).await;
        Self::degrade("stats", result)
    }

    // ==================== Writes ====================

    /// Upsert by id, overwriting every field of an existing record.
    pub async fn put(&self, record: PhotoRecord) -> StoreResult<()> {
        let id = record.id.clone();
        let result = self.run_blocking(move |db| db.upsert_photo(&record)).await;
        if result.is_ok() {
            tracing::debug!(photo_id = %id, "Photo stored");
        }
        Self::report("put", result)
    }

    /// Store a new capture: assigns an id, projects the thumbnail and
    /// returns the listing view of the new record.
    pub async fn capture(
        &self,
        door_id: &str,
        aircraft_type: &str,
        full_image: Vec<u8>,
    ) -> StoreResult<PhotoProjection> {
        let projector = self.projector;
        let record = PhotoRecord::new(door_id, aircraft_type, full_image);

        let result = self
            .run_blocking(move |db| {
                let thumbnail = projector.project(&record.full_image);
                let record = record.with_thumbnail(thumbnail);
                db.upsert_photo(&record)?;
                Ok(PhotoProjection::from(&record))
            })
            .await;

        if let Ok(projection) = &result {
            tracing::info!(
                photo_id = %projection.id,
                door_id = %projection.door_id,
                aircraft = %projection.aircraft_type,
                "Photo captured"
            );
        }
        Self::report("capture", result)
    }

    /// Replace the image of an existing photo, keeping its id, door and
    /// scope. Returns `None` when the id is unknown.
    pub async fn retake(&self, id: &str, full_image: Vec<u8>) -> StoreResult<Option<PhotoProjection>> {
        let projector = self.projector;
        let id = id.to_string();

        let result = self
            .run_blocking(move |db| {
                let thumbnail = projector.project(&full_image);
                let timestamp = now_iso8601();
                if !db.replace_photo_image(&id, &full_image, &thumbnail, &timestamp)? {
                    return Ok(None);
                }
                drop(full_image);
                let header = db.get_photo_headers(std::slice::from_ref(&id))?.into_iter().next();
                Ok(header.map(|h| PhotoProjection {
                    id: h.id,
                    door_id: h.door_id,
                    aircraft_type: h.aircraft_type,
                    thumbnail,
                    timestamp: h.timestamp,
                }))
            })
            .await;

        if let Ok(Some(projection)) = &result {
            tracing::info!(photo_id = %projection.id, "Photo retaken");
        }
        Self::report("retake", result)
    }

    /// Delete every id in the batch.
    ///
    /// Succeeds only when every deletion completes. On failure some ids
    /// may already be gone; re-query to learn the actual state. Unknown
    /// ids count as deleted.
    pub async fn delete_many(&self, ids: &[String]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids = ids.to_vec();
        let requested = ids.len();

        let result = self.run_blocking(move |db| db.delete_photos(&ids)).await;
        if let Ok(deleted) = &result {
            tracing::info!(requested, deleted, "Photos deleted");
        }
        Self::report("delete_many", result.map(|_| ()))
    }

    /// Delete every photo of one aircraft scope. Returns how many were removed.
    pub async fn delete_by_scope(&self, aircraft_type: &str) -> StoreResult<usize> {
        let scope = aircraft_type.to_string();
        let result = self.run_blocking(move |db| db.delete_photos_by_scope(&scope)).await;
        if let Ok(deleted) = &result {
            tracing::warn!(aircraft = aircraft_type, deleted, "Cleared aircraft scope");
        }
        Self::report("delete_by_scope", result)
    }

    // ==================== Inspection metadata ====================

    pub async fn save_inspection(&self, meta: InspectionMetadata) -> StoreResult<()> {
        let result = self.run_blocking(move |db| db.upsert_inspection(&meta)).await;
        Self::report("save_inspection", result)
    }

    pub async fn load_inspection(&self, aircraft_type: &str) -> Option<InspectionMetadata> {
        let scope = aircraft_type.to_string();
        let result = self.run_blocking(move |db| db.get_inspection(&scope)).await;
        Self::degrade("load_inspection", result)
    }

    pub async fn clear_inspection(&self, aircraft_type: &str) -> StoreResult<bool> {
        let scope = aircraft_type.to_string();
        let result = self.run_blocking(move |db| db.delete_inspection(&scope)).await;
        Self::report("clear_inspection", result)
    }
}

/// List rows and fill in missing thumbnails. Runs on the blocking pool.
fn load_with_backfill(
    db: &Database,
    projector: ThumbnailProjector,
    scope: Option<&str>,
    writes: &AtomicU64,
) -> AppResult<Vec<PhotoProjection>> {
    let rows = db.list_photo_rows(scope)?;
    let mut projections = Vec::with_capacity(rows.len());
    let mut backfilled = 0usize;

    for row in rows {
        let thumbnail = match row.thumbnail {
            Some(thumbnail) => thumbnail,
            None => {
                backfilled += 1;
                backfill_thumbnail(db, projector, &row.id, writes)?
            }
        };

        projections.push(PhotoProjection {
            id: row.id,
            door_id: row.door_id,
            aircraft_type: row.aircraft_type,
            thumbnail,
            timestamp: row.timestamp,
        });
    }

    if backfilled > 0 {
        tracing::info!(backfilled, total = projections.len(), "Backfilled missing thumbnails");
    }

    Ok(projections)
}

/// Compute and persist the thumbnail of one legacy row. The full image
/// is dropped before returning.
fn backfill_thumbnail(
    db: &Database,
    projector: ThumbnailProjector,
    id: &str,
    writes: &AtomicU64,
) -> AppResult<Vec<u8>> {
    let Some(full_image) = db.get_full_image(id)? else {
        // deleted since the listing query
        return Ok(Vec::new());
    };
    let thumbnail = projector.project(&full_image);
    drop(full_image);

    match db.set_thumbnail_if_missing(id, &thumbnail) {
        Ok(true) => {
            writes.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(photo_id = id, thumbnail_len = thumbnail.len(), "Thumbnail backfilled");
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(photo_id = id, "Could not persist backfilled thumbnail: {}", e);
        }
    }

    Ok(thumbnail)
}
