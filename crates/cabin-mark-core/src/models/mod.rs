//! Data models.

pub mod export;
pub mod inspection;
pub mod layout;
pub mod photo;
pub mod settings;

pub use export::{ExportArtifact, ExportOutcome, ExportReport, ExportSpec, SkippedPhoto};
pub use inspection::InspectionMetadata;
pub use layout::{AircraftLayout, DoorPosition, LayoutCatalog};
pub use photo::{now_iso8601, PhotoHeader, PhotoProjection, PhotoRecord};
pub use settings::{AppSettings, ExportSettings, StorageSettings, ThumbnailSettings};
