//! Per-aircraft inspection metadata (registration and inspection label).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionMetadata {
    pub aircraft_type: String,
    /// Tail registration, e.g. `B-30AB`
    pub registration: String,
    /// Inspection kind printed in the export title, e.g. `Arrival`
    pub inspection_label: String,
    pub updated_at: String,
}

impl InspectionMetadata {
    pub fn new(
        aircraft_type: impl Into<String>,
        registration: impl Into<String>,
        inspection_label: impl Into<String>,
    ) -> Self {
        Self {
            aircraft_type: aircraft_type.into(),
            registration: registration.into(),
            inspection_label: inspection_label.into(),
            updated_at: super::photo::now_iso8601(),
        }
    }

    /// True when both fields required by an export are filled in.
    pub fn is_complete(&self) -> bool {
        !self.registration.trim().is_empty() && !self.inspection_label.trim().is_empty()
    }
}
