//! Aircraft layout catalog: door ids mapped to labels and outline
//! coordinates.
//!
//! The catalog is read-only to the core. It is consulted for export
//! ordering (x, y) and for the label printed under each photo.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// One photographed location on an aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorPosition {
    pub id: String,
    /// Human-readable label printed in exports
    pub label: String,
    /// Short badge text used by the watermark stamper
    pub watermark: String,
    /// Percent from the left edge of the outline
    pub x: f64,
    /// Percent from the top edge of the outline
    pub y: f64,
}

/// Door table for one aircraft type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftLayout {
    pub id: String,
    pub label: String,
    pub doors: Vec<DoorPosition>,
}

impl AircraftLayout {
    pub fn door(&self, door_id: &str) -> Option<&DoorPosition> {
        self.doors.iter().find(|d| d.id == door_id)
    }

    /// Label for `door_id`, falling back to the raw id for doors the
    /// table does not know.
    pub fn door_label<'a>(&'a self, door_id: &'a str) -> &'a str {
        self.door(door_id).map(|d| d.label.as_str()).unwrap_or(door_id)
    }
}

/// All known aircraft layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCatalog {
    pub aircraft: Vec<AircraftLayout>,
}

impl LayoutCatalog {
    pub fn aircraft(&self, aircraft_id: &str) -> Option<&AircraftLayout> {
        self.aircraft.iter().find(|a| a.id == aircraft_id)
    }

    pub fn aircraft_ids(&self) -> impl Iterator<Item = &str> {
        self.aircraft.iter().map(|a| a.id.as_str())
    }

    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let catalog: LayoutCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read layout file {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), aircraft = catalog.aircraft.len(), "Loaded layout catalog");
        Ok(catalog)
    }

    /// Use the file at `path` when given, otherwise the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin()),
        }
    }

    fn validate(&self) -> AppResult<()> {
        for aircraft in &self.aircraft {
            for door in &aircraft.doors {
                if !door.x.is_finite() || !door.y.is_finite() {
                    return Err(AppError::Config(format!(
                        "door {}/{} has a non-finite position",
                        aircraft.id, door.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Door tables of the supported Airbus narrow- and wide-bodies.
    pub fn builtin() -> Self {
        fn door(id: &str, label: &str, watermark: &str, x: f64, y: f64) -> DoorPosition {
            DoorPosition {
                id: id.to_string(),
                label: label.to_string(),
                watermark: watermark.to_string(),
                x,
                y,
            }
        }
        fn aircraft(id: &str, label: &str, doors: Vec<DoorPosition>) -> AircraftLayout {
            AircraftLayout {
                id: id.to_string(),
                label: label.to_string(),
                doors,
            }
        }

        let fap = || door("fap", "FAP Panel Page", "FAP", 50.0, 10.0);

        Self {
            aircraft: vec![
                aircraft("A319", "A319", vec![
                    door("fap", "FAP Panel Page", "FAP", 50.0, 13.0),
                    door("l1", "L1 Passenger Door", "L1", 38.0, 22.0),
                    door("r1", "R1 Passenger Door", "R1", 62.0, 22.0),
                    door("l_ow", "LH Emergency Exit", "LH EMG", 39.0, 50.5),
                    door("r_ow", "RH Emergency Exit", "RH EMG", 61.0, 50.5),
                    door("l2", "L2 Passenger Door", "L2", 38.0, 85.0),
                    door("r2", "R2 Passenger Door", "R2", 62.0, 85.0),
                    door("lh_cyl", "Cargo LH Cylinder", "LH CYL", 42.0, 62.5),
                    door("rh_cyl", "Cargo RH Cylinder", "RH CYL", 58.0, 62.5),
                ]),
                aircraft("A320", "A320", vec![
                    fap(),
                    door("l1", "L1 Passenger Door", "L1", 38.0, 20.0),
                    door("r1", "R1 Passenger Door", "R1", 62.0, 20.0),
                    door("l1_emg", "L1 Emergency Exit", "L1 EMG", 39.0, 49.5),
                    door("l2_emg", "L2 Emergency Exit", "L2 EMG", 39.0, 56.5),
                    door("r1_emg", "R1 Emergency Exit", "R1 EMG", 61.0, 49.5),
                    door("r2_emg", "R2 Emergency Exit", "R2 EMG", 61.0, 56.5),
                    door("l2", "L2 Passenger Door", "L2", 38.0, 88.0),
                    door("r2", "R2 Passenger Door", "R2", 62.0, 88.0),
                    door("lh_cyl", "Cargo LH Cylinder", "LH CYL", 42.0, 65.5),
                    door("rh_cyl", "Cargo RH Cylinder", "RH CYL", 58.0, 65.5),
                ]),
                aircraft("A321", "A321", vec![
                    fap(),
                    door("l1", "L1 Passenger Door", "L1", 38.0, 15.0),
                    door("r1", "R1 Passenger Door", "R1", 62.0, 15.0),
                    door("l2", "L1 Emergency Exit", "L1 EMG", 38.0, 35.0),
                    door("r2", "R1 Emergency Exit", "R1 EMG", 62.0, 35.0),
                    door("l3", "L2 Emergency Exit", "L2 EMG", 38.0, 65.0),
                    door("r3", "R2 Emergency Exit", "R2 EMG", 62.0, 65.0),
                    door("l4", "L2 Passenger Door", "L2", 38.0, 92.0),
                    door("r4", "R2 Passenger Door", "R2", 62.0, 92.0),
                ]),
                aircraft("A321ACF", "A321 ACF", vec![
                    fap(),
                    door("l1", "L1 Passenger Door", "L1", 38.0, 15.0),
                    door("r1", "R1 Passenger Door", "R1", 62.0, 15.0),
                    door("l1_emg", "L1 Emergency Exit", "L1 EMG", 38.0, 45.0),
                    door("r1_emg", "R1 Emergency Exit", "R1 EMG", 62.0, 45.0),
                    door("l2_emg", "L2 Emergency Exit", "L2 EMG", 38.0, 51.0),
                    door("r2_emg", "R2 Emergency Exit", "R2 EMG", 62.0, 51.0),
                    door("lh_cyl", "Cargo LH Cylinder", "LH CYL", 42.0, 60.5),
                    door("rh_cyl", "Cargo RH Cylinder", "RH CYL", 58.0, 60.5),
                    door("l3_emg", "L3 Emergency Exit", "L3 EMG", 38.0, 70.0),
                    door("r3_emg", "R3 Emergency Exit", "R3 EMG", 62.0, 70.0),
                    door("l2", "L2 Passenger Door", "L2", 38.0, 92.0),
                    door("r2", "R2 Passenger Door", "R2", 62.0, 92.0),
                ]),
                aircraft("A330", "A330", vec![
                    fap(),
                    door("l1", "L1 Passenger Door", "L1", 35.0, 15.0),
                    door("r1", "R1 Passenger Door", "R1", 65.0, 15.0),
                    door("l2", "L2 Passenger Door", "L2", 35.0, 40.0),
                    door("r2", "R2 Passenger Door", "R2", 65.0, 40.0),
                    door("lh_emg", "LH Emergency Exit", "LH EMG", 35.0, 65.0),
                    door("rh_emg", "RH Emergency Exit", "RH EMG", 65.0, 65.0),
                    door("l3", "L3 Passenger Door", "L3", 35.0, 90.0),
                    door("r3", "R3 Passenger Door", "R3", 65.0, 90.0),
                ]),
                aircraft("A350", "A350", vec![
                    fap(),
                    door("l1", "L1 Passenger Door", "L1", 35.0, 15.0),
                    door("r1", "R1 Passenger Door", "R1", 65.0, 15.0),
                    door("l2", "L2 Passenger Door", "L2", 35.0, 32.0),
                    door("r2", "R2 Passenger Door", "R2", 65.0, 32.0),
                    door("l3", "L3 Passenger Door", "L3", 35.0, 68.0),
                    door("r3", "R3 Passenger Door", "R3", 65.0, 68.0),
                    door("l4", "L4 Passenger Door", "L4", 35.0, 90.0),
                    door("r4", "R4 Passenger Door", "R4", 65.0, 90.0),
                ]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = LayoutCatalog::builtin();
        let ids: Vec<&str> = catalog.aircraft_ids().collect();
        assert_eq!(ids, vec!["A319", "A320", "A321", "A321ACF", "A330", "A350"]);

        let a320 = catalog.aircraft("A320").unwrap();
        let l1 = a320.door("l1").unwrap();
        assert_eq!((l1.x, l1.y), (38.0, 20.0));
        assert_eq!(a320.door_label("nope"), "nope");
    }

    #[test]
    fn test_json_round_trip_and_file_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("layout.json");
        let custom = LayoutCatalog {
            aircraft: vec![AircraftLayout {
                id: "B738".to_string(),
                label: "737-800".to_string(),
                doors: vec![DoorPosition {
                    id: "l1".to_string(),
                    label: "L1".to_string(),
                    watermark: "L1".to_string(),
                    x: 30.0,
                    y: 10.0,
                }],
            }],
        };
        std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();

        let loaded = LayoutCatalog::load_or_builtin(Some(&path)).unwrap();
        assert_eq!(loaded, custom);
        assert!(LayoutCatalog::load_or_builtin(None).unwrap().aircraft("A320").is_some());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = LayoutCatalog::from_json_str("{\"aircraft\": 3}").unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }
}
