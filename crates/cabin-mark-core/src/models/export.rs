//! Export request and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::ExportError;
use crate::utils::sanitize::sanitize_filename_component;

/// What to export: one aircraft scope, its header metadata and the
/// selected photos. Built by the caller from the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSpec {
    pub aircraft_id: String,
    pub registration: String,
    pub inspection_label: String,
    pub photo_ids: Vec<String>,
}

impl ExportSpec {
    /// Reject empty selections and missing header metadata.
    pub fn check_preconditions(&self) -> Result<(), ExportError> {
        if self.photo_ids.is_empty() {
            return Err(ExportError::Precondition("no photos selected for export".to_string()));
        }
        if self.registration.trim().is_empty() {
            return Err(ExportError::Precondition("aircraft registration is missing".to_string()));
        }
        if self.inspection_label.trim().is_empty() {
            return Err(ExportError::Precondition("inspection label is missing".to_string()));
        }
        Ok(())
    }

    /// Title printed in the header block.
    pub fn title(&self) -> String {
        format!("{} {}", self.registration.trim(), self.inspection_label.trim())
    }
}

/// A photo left out of the composite and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedPhoto {
    pub id: String,
    pub reason: String,
}

/// Statistics of a finished export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// Photos drawn into the composite
    pub drawn: usize,
    pub skipped: Vec<SkippedPhoto>,
    /// Highest number of full-resolution images decoded at the same time
    pub peak_live_decodes: usize,
    pub width: u32,
    pub height: u32,
}

/// The composed image of one export run.
///
/// Never persisted. Dropping it frees the encoded buffer.
#[derive(Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub produced_at: DateTime<Utc>,
    pub report: ExportReport,
}

impl ExportArtifact {
    /// `{registration}_{aircraft}_{yyyyMMddHHmmss}.jpg`
    pub fn suggested_file_name(&self, spec: &ExportSpec) -> String {
        format!(
            "{}_{}_{}.jpg",
            sanitize_filename_component(&spec.registration, "EXPORT"),
            sanitize_filename_component(&spec.aircraft_id, "aircraft"),
            self.produced_at.format("%Y%m%d%H%M%S")
        )
    }
}

impl std::fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("bytes_len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("produced_at", &self.produced_at)
            .field("report", &self.report)
            .finish()
    }
}

/// Terminal state of an export call that did not fail.
#[derive(Debug)]
pub enum ExportOutcome {
    Completed(ExportArtifact),
    /// The caller cancelled; everything acquired by the run was released.
    Cancelled,
}

impl ExportOutcome {
    pub fn artifact(self) -> Option<ExportArtifact> {
        match self {
            ExportOutcome::Completed(artifact) => Some(artifact),
            ExportOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportOutcome::Cancelled)
    }
}
