//! Host command handlers.
//!
//! Each handler maps one user action onto the core and reports failures
//! as a [`CommandError`] with a stable code.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use cabin_mark_core::models::InspectionMetadata;
use cabin_mark_core::{
    AircraftLayout, AppError, CabinMarkCore, CommandError, ExportOutcome, ExportReport, PhotoProjection,
};

fn io_error(e: std::io::Error) -> CommandError {
    CommandError::from(AppError::from(e))
}

fn not_found(what: &str, id: &str) -> CommandError {
    CommandError::from(AppError::NotFound(format!("{} {}", what, id)))
}

fn known_aircraft<'a>(core: &'a CabinMarkCore, aircraft: &str) -> Result<&'a AircraftLayout, CommandError> {
    core.layouts().aircraft(aircraft).ok_or_else(|| {
        let known: Vec<&str> = core.layouts().aircraft_ids().collect();
        CommandError::new(
            "E_UNKNOWN_AIRCRAFT",
            format!("unknown aircraft {} (known: {})", aircraft, known.join(", ")),
        )
    })
}

/// Store a stamped photo for one door.
pub async fn import_photo(
    core: &CabinMarkCore,
    aircraft: &str,
    door: &str,
    file: &Path,
) -> Result<PhotoProjection, CommandError> {
    let layout = known_aircraft(core, aircraft)?;
    if layout.door(door).is_none() {
        return Err(CommandError::new(
            "E_UNKNOWN_DOOR",
            format!("aircraft {} has no door {}", aircraft, door),
        ));
    }

    let bytes = tokio::fs::read(file).await.map_err(io_error)?;
    let projection = core.store().capture(door, aircraft, bytes).await?;
    if projection.thumbnail.is_empty() {
        tracing::warn!(photo_id = %projection.id, file = %file.display(), "Imported file is not a readable image");
    }
    Ok(projection)
}

/// Replace the image of an existing photo.
pub async fn retake_photo(core: &CabinMarkCore, id: &str, file: &Path) -> Result<PhotoProjection, CommandError> {
    let bytes = tokio::fs::read(file).await.map_err(io_error)?;
    core.store()
        .retake(id, bytes)
        .await?
        .ok_or_else(|| not_found("photo", id))
}

pub async fn list_photos(core: &CabinMarkCore, aircraft: Option<&str>) -> Vec<PhotoProjection> {
    match aircraft {
        Some(aircraft) => core.store().load_projections_for_scope(aircraft).await,
        None => core.store().load_all_projections().await,
    }
}

/// Write the full image of `id` to `out`, or to its suggested file name.
pub async fn save_full_image(core: &CabinMarkCore, id: &str, out: Option<PathBuf>) -> Result<PathBuf, CommandError> {
    let record = core.store().get_full(id).await.ok_or_else(|| not_found("photo", id))?;

    let path = match out {
        Some(path) => path,
        None => {
            let meta = core.store().load_inspection(&record.aircraft_type).await;
            let registration = meta.as_ref().map(|m| m.registration.as_str());
            PathBuf::from(record.suggested_file_name(registration))
        }
    };

    tokio::fs::write(&path, &record.full_image).await.map_err(io_error)?;
    Ok(path)
}

pub async fn delete_photos(core: &CabinMarkCore, ids: &[String]) -> Result<(), CommandError> {
    core.store().delete_many(ids).await?;
    Ok(())
}

pub async fn clear_aircraft(core: &CabinMarkCore, aircraft: &str) -> Result<usize, CommandError> {
    Ok(core.clear_aircraft(aircraft).await?)
}

pub async fn set_inspection(
    core: &CabinMarkCore,
    aircraft: &str,
    registration: &str,
    label: &str,
) -> Result<InspectionMetadata, CommandError> {
    known_aircraft(core, aircraft)?;

    let meta = InspectionMetadata::new(aircraft, registration.trim().to_uppercase(), label.trim());
    if !meta.is_complete() {
        return Err(CommandError::new(
            "E_INVALID_ARGUMENT",
            "registration and inspection label must not be blank",
        ));
    }
    core.store().save_inspection(meta.clone()).await?;
    Ok(meta)
}

pub async fn get_inspection(core: &CabinMarkCore, aircraft: &str) -> Result<InspectionMetadata, CommandError> {
    core.store()
        .load_inspection(aircraft)
        .await
        .ok_or_else(|| not_found("inspection details for", aircraft))
}

/// Result of a finished export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bytes: usize,
    pub report: ExportReport,
}

/// Export every photo of `aircraft`. Returns `None` when cancelled.
///
/// `out` may name a file or an existing directory; by default the
/// artifact goes to the Exports data folder.
pub async fn export_aircraft(
    core: &CabinMarkCore,
    aircraft: &str,
    out: Option<PathBuf>,
) -> Result<Option<ExportSummary>, CommandError> {
    let spec = core.spec_for_scope(aircraft).await?;

    let artifact = match core.export(&spec).await? {
        ExportOutcome::Completed(artifact) => artifact,
        ExportOutcome::Cancelled => return Ok(None),
    };

    let file_name = artifact.suggested_file_name(&spec);
    let path = match out {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path,
        None => core.paths().exports_dir().join(file_name),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(&path, &artifact.bytes).await.map_err(io_error)?;

    Ok(Some(ExportSummary {
        path,
        bytes: artifact.bytes.len(),
        report: artifact.report,
    }))
}

pub async fn photo_counts(core: &CabinMarkCore) -> BTreeMap<String, i64> {
    core.store().count_by_scope().await
}
