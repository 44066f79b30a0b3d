//! Photo data model.

use serde::{Deserialize, Serialize};

use crate::utils::sanitize::{compact_timestamp, sanitize_filename_component};

/// A stored inspection photo, including the full-resolution image.
///
/// Only [`PhotoStore::get_full`](crate::services::PhotoStore::get_full)
/// hands these out. Bulk listings use [`PhotoProjection`].
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Opaque id, stable across retakes
    pub id: String,
    /// Door (location) the photo documents
    pub door_id: String,
    /// Aircraft scope, e.g. `A320`
    pub aircraft_type: String,
    /// Watermarked full-resolution image (JPEG/PNG bytes)
    pub full_image: Vec<u8>,
    /// Lightweight JPEG; `None` for legacy records not yet backfilled
    pub thumbnail: Option<Vec<u8>>,
    /// ISO 8601 capture time
    pub timestamp: String,
}

impl PhotoRecord {
    /// Create a record for a fresh capture with a new id and the current time.
    pub fn new(door_id: impl Into<String>, aircraft_type: impl Into<String>, full_image: Vec<u8>) -> Self {
        Self {
            id: new_photo_id(),
            door_id: door_id.into(),
            aircraft_type: aircraft_type.into(),
            full_image,
            thumbnail: None,
            timestamp: now_iso8601(),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Vec<u8>) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    /// Metadata-only view of this record.
    pub fn header(&self) -> PhotoHeader {
        PhotoHeader {
            id: self.id.clone(),
            door_id: self.door_id.clone(),
            aircraft_type: self.aircraft_type.clone(),
            timestamp: self.timestamp.clone(),
        }
    }

    /// File name used when sharing or downloading this photo on its own.
    pub fn suggested_file_name(&self, registration: Option<&str>) -> String {
        let reg = sanitize_filename_component(registration.unwrap_or(""), "IMG");
        let door = sanitize_filename_component(&self.door_id, "door");
        format!("{}_{}_{}.jpg", reg, door, compact_timestamp(&self.timestamp))
    }
}

// Full images are megabytes; print their size instead of their bytes.
impl std::fmt::Debug for PhotoRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoRecord")
            .field("id", &self.id)
            .field("door_id", &self.door_id)
            .field("aircraft_type", &self.aircraft_type)
            .field("full_image_len", &self.full_image.len())
            .field("thumbnail_len", &self.thumbnail.as_ref().map(Vec::len))
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Thumbnail-only view of a photo used in bulk listings.
///
/// There is no full-image field at all, so a listing can never carry
/// full-resolution bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoProjection {
    pub id: String,
    pub door_id: String,
    pub aircraft_type: String,
    /// Empty when the full image could not be decoded
    pub thumbnail: Vec<u8>,
    pub timestamp: String,
}

impl std::fmt::Debug for PhotoProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoProjection")
            .field("id", &self.id)
            .field("door_id", &self.door_id)
            .field("aircraft_type", &self.aircraft_type)
            .field("thumbnail_len", &self.thumbnail.len())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl From<&PhotoRecord> for PhotoProjection {
    fn from(record: &PhotoRecord) -> Self {
        Self {
            id: record.id.clone(),
            door_id: record.door_id.clone(),
            aircraft_type: record.aircraft_type.clone(),
            thumbnail: record.thumbnail.clone().unwrap_or_default(),
            timestamp: record.timestamp.clone(),
        }
    }
}

/// Image-free metadata of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoHeader {
    pub id: String,
    pub door_id: String,
    pub aircraft_type: String,
    pub timestamp: String,
}

/// Generate a new opaque photo id.
pub fn new_photo_id() -> String {
    format!("p-{}", uuid::Uuid::new_v4().simple())
}

/// Current UTC time as ISO 8601 with millisecond precision.
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
