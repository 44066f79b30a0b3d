//! Inspection metadata data access.

use rusqlite::{params, OptionalExtension, Row};

use crate::models::InspectionMetadata;
use crate::utils::error::AppResult;

use super::connection::Database;

fn row_to_inspection(row: &Row<'_>) -> rusqlite::Result<InspectionMetadata> {
    Ok(InspectionMetadata {
        aircraft_type: row.get("aircraft_type")?,
        registration: row.get("registration")?,
        inspection_label: row.get("inspection_label")?,
        updated_at: row.get("updated_at")?,
    })
}

impl Database {
    /// Insert or replace the metadata of one aircraft scope.
    pub fn upsert_inspection(&self, meta: &InspectionMetadata) -> AppResult<()> {
        let conn = self.connection()?;

        conn.execute(
            r#"
            INSERT INTO inspections (aircraft_type, registration, inspection_label, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(aircraft_type) DO UPDATE SET
                registration = excluded.registration,
                inspection_label = excluded.inspection_label,
                updated_at = excluded.updated_at
            "#,
            params![
                meta.aircraft_type,
                meta.registration,
                meta.inspection_label,
                meta.updated_at,
            ],
        )?;

        Ok(())
    }

    pub fn get_inspection(&self, aircraft_type: &str) -> AppResult<Option<InspectionMetadata>> {
        let conn = self.connection()?;

        let meta = conn
            .query_row(
                "SELECT * FROM inspections WHERE aircraft_type = ?1",
                params![aircraft_type],
                row_to_inspection,
            )
            .optional()?;

        Ok(meta)
    }

    /// Returns `true` when a row was removed.
    pub fn delete_inspection(&self, aircraft_type: &str) -> AppResult<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "DELETE FROM inspections WHERE aircraft_type = ?1",
            params![aircraft_type],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspection_crud() {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();

        assert!(db.get_inspection("A320").unwrap().is_none());

        let meta = InspectionMetadata::new("A320", "B-30AB", "Arrival");
        db.upsert_inspection(&meta).unwrap();
        assert_eq!(db.get_inspection("A320").unwrap(), Some(meta.clone()));

        let updated = InspectionMetadata::new("A320", "B-30AB", "Departure");
        db.upsert_inspection(&updated).unwrap();
        assert_eq!(db.get_inspection("A320").unwrap().unwrap().inspection_label, "Departure");

        assert!(db.delete_inspection("A320").unwrap());
        assert!(!db.delete_inspection("A320").unwrap());
        assert!(db.get_inspection("A320").unwrap().is_none());
    }
}
