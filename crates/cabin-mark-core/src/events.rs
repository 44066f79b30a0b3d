//! Event emission for hosts.
//!
//! The core never talks to a UI directly. Hosts hand in an [`EventSink`]
//! and receive named events with JSON payloads.

use std::sync::Arc;

use serde::Serialize;

/// Emitted after each photo of an export has been handled.
pub const EXPORT_PROGRESS: &str = "export-progress";
/// Emitted once when an export completes, fails or is cancelled.
pub const EXPORT_FINISHED: &str = "export-finished";

/// Receiver of core events.
pub trait EventSink: Send + Sync {
    /// Emit an event with the given name and JSON payload.
    fn emit(&self, event_name: &str, payload_json: &str);
}

/// Typed emit for any [`EventSink`].
pub trait EventSinkExt {
    fn emit_typed<T: Serialize>(&self, event_name: &str, payload: &T);
}

impl<S: EventSink + ?Sized> EventSinkExt for S {
    fn emit_typed<T: Serialize>(&self, event_name: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => self.emit(event_name, &json),
            Err(e) => {
                tracing::error!(event = event_name, "Failed to serialize event payload: {}", e);
            }
        }
    }
}

pub type SharedEventSink = Arc<dyn EventSink>;

/// Phase of an export run reported in [`ExportProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    Measuring,
    Drawing,
    Encoding,
}

/// Payload of [`EXPORT_PROGRESS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    pub job_id: u64,
    pub stage: ExportStage,
    /// Photos handled so far in this stage
    pub current: usize,
    pub total: usize,
}

/// Payload of [`EXPORT_FINISHED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFinished {
    pub job_id: u64,
    /// `completed`, `cancelled` or `failed`
    pub status: &'static str,
    pub drawn: usize,
    pub skipped: usize,
    pub error_code: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event_name: &str, _payload_json: &str) {}
}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        tracing::debug!(event = event_name, payload = payload_json, "Event emitted");
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(name, payload_json)` pairs in emission order.
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|(name, _)| name).collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event_name.to_string(), payload_json.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_typed_serializes_camel_case() {
        let sink = RecordingEventSink::new();
        sink.emit_typed(
            EXPORT_PROGRESS,
            &ExportProgress {
                job_id: 3,
                stage: ExportStage::Drawing,
                current: 1,
                total: 4,
            },
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "export-progress");
        assert!(events[0].1.contains("\"stage\":\"drawing\""));
        assert!(events[0].1.contains("\"jobId\":3"));
    }
}
