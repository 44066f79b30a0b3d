//! Photo data access.
//!
//! Listing queries never select the `full_image` column; only
//! [`Database::get_photo`] and [`Database::get_full_image`] read it, one
//! row at a time.

use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension, Row};

use crate::models::{PhotoHeader, PhotoRecord};
use crate::utils::error::AppResult;

use super::connection::Database;

/// Listing row: everything but the full image. `thumbnail` is `None`
/// for rows that still need a backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoListRow {
    pub id: String,
    pub door_id: String,
    pub aircraft_type: String,
    pub thumbnail: Option<Vec<u8>>,
    pub timestamp: String,
}

fn row_to_photo(row: &Row<'_>) -> rusqlite::Result<PhotoRecord> {
    Ok(PhotoRecord {
        id: row.get("id")?,
        door_id: row.get("door_id")?,
        aircraft_type: row.get("aircraft_type")?,
        full_image: row.get("full_image")?,
        thumbnail: row.get("thumbnail")?,
        timestamp: row.get("timestamp")?,
    })
}

fn row_to_list_row(row: &Row<'_>) -> rusqlite::Result<PhotoListRow> {
    Ok(PhotoListRow {
        id: row.get("id")?,
        door_id: row.get("door_id")?,
        aircraft_type: row.get("aircraft_type")?,
        thumbnail: row.get("thumbnail")?,
        timestamp: row.get("timestamp")?,
    })
}

fn row_to_header(row: &Row<'_>) -> rusqlite::Result<PhotoHeader> {
    Ok(PhotoHeader {
        id: row.get("id")?,
        door_id: row.get("door_id")?,
        aircraft_type: row.get("aircraft_type")?,
        timestamp: row.get("timestamp")?,
    })
}

impl Database {
    /// Insert a photo, or overwrite every column of the row with the same id.
    pub fn upsert_photo(&self, photo: &PhotoRecord) -> AppResult<()> {
        let conn = self.connection()?;

        conn.execute(
            r#"
            INSERT INTO photos (id, door_id, aircraft_type, full_image, thumbnail, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                door_id = excluded.door_id,
                aircraft_type = excluded.aircraft_type,
                full_image = excluded.full_image,
                thumbnail = excluded.thumbnail,
                timestamp = excluded.timestamp
            "#,
            params![
                photo.id,
                photo.door_id,
                photo.aircraft_type,
                photo.full_image,
                photo.thumbnail,
                photo.timestamp,
            ],
        )?;

        Ok(())
    }

    /// Complete record including the full image.
    pub fn get_photo(&self, id: &str) -> AppResult<Option<PhotoRecord>> {
        let conn = self.connection()?;

        let photo = conn
            .query_row(
                "SELECT id, door_id, aircraft_type, full_image, thumbnail, timestamp FROM photos WHERE id = ?1",
                params![id],
                row_to_photo,
            )
            .optional()?;

        Ok(photo)
    }

    /// Just the full image of one photo.
    pub fn get_full_image(&self, id: &str) -> AppResult<Option<Vec<u8>>> {
        let conn = self.connection()?;

        let image = conn
            .query_row(
                "SELECT full_image FROM photos WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(image)
    }

    /// All photos (optionally of one aircraft scope) without full images,
    /// oldest first.
    pub fn list_photo_rows(&self, aircraft_type: Option<&str>) -> AppResult<Vec<PhotoListRow>> {
        let conn = self.connection()?;

        let rows = match aircraft_type {
            Some(scope) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, door_id, aircraft_type, thumbnail, timestamp FROM photos
                    WHERE aircraft_type = ?1
                    ORDER BY timestamp ASC, id ASC
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![scope], row_to_list_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, door_id, aircraft_type, thumbnail, timestamp FROM photos
                    ORDER BY timestamp ASC, id ASC
                    "#,
                )?;
                let rows = stmt
                    .query_map([], row_to_list_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(rows)
    }

    /// Store a backfilled thumbnail unless one was written in the meantime.
    ///
    /// Returns `true` when the row was updated.
    pub fn set_thumbnail_if_missing(&self, id: &str, thumbnail: &[u8]) -> AppResult<bool> {
        let conn = self.connection()?;

        let changed = conn.execute(
            "UPDATE photos SET thumbnail = ?2 WHERE id = ?1 AND thumbnail IS NULL",
            params![id, thumbnail],
        )?;

        Ok(changed > 0)
    }

    /// Replace the image of an existing photo (retake). Returns `false`
    /// when the id is unknown.
    pub fn replace_photo_image(
        &self,
        id: &str,
        full_image: &[u8],
        thumbnail: &[u8],
        timestamp: &str,
    ) -> AppResult<bool> {
        let conn = self.connection()?;

        let changed = conn.execute(
            "UPDATE photos SET full_image = ?2, thumbnail = ?3, timestamp = ?4 WHERE id = ?1",
            params![id, full_image, thumbnail, timestamp],
        )?;

        Ok(changed > 0)
    }

    /// Headers for `ids`, in the order given. Unknown ids are left out.
    pub fn get_photo_headers(&self, ids: &[String]) -> AppResult<Vec<PhotoHeader>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, door_id, aircraft_type, timestamp FROM photos WHERE id = ?1",
        )?;

        let mut headers = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(header) = stmt.query_row(params![id], row_to_header).optional()? {
                headers.push(header);
            }
        }

        Ok(headers)
    }

    /// Ids of one aircraft scope, oldest first.
    pub fn photo_ids_for_scope(&self, aircraft_type: &str) -> AppResult<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM photos WHERE aircraft_type = ?1 ORDER BY timestamp ASC, id ASC",
        )?;

        let ids = stmt
            .query_map(params![aircraft_type], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    /// Photo count per aircraft scope.
    pub fn count_photos_by_scope(&self) -> AppResult<BTreeMap<String, i64>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT aircraft_type, COUNT(*) FROM photos GROUP BY aircraft_type",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(counts)
    }

    /// Delete every photo in `ids` in one transaction. Unknown ids are
    /// not an error. Returns the number of rows removed.
    pub fn delete_photos(&self, ids: &[String]) -> AppResult<usize> {
        self.transaction(|conn| {
            let mut stmt = conn.prepare("DELETE FROM photos WHERE id = ?1")?;
            let mut deleted = 0;
            for id in ids {
                deleted += stmt.execute(params![id])?;
            }
            Ok(deleted)
        })
    }

    /// Delete every photo of one aircraft scope.
    pub fn delete_photos_by_scope(&self, aircraft_type: &str) -> AppResult<usize> {
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM photos WHERE aircraft_type = ?1",
            params![aircraft_type],
        )?;
        Ok(deleted)
    }
}
