//! Error types for the core library.
//!
//! `AppError` covers general failures (settings, layout files, I/O).
//! `StoreError` is what the photo store reports for writes, and
//! `ExportError` carries the taxonomy tag that hosts use to pick a
//! user-facing message.

use serde::Serialize;
use thiserror::Error;

/// General application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode/encode error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Lookup target does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    General(String),
}

/// Failure reported by [`PhotoStore`](crate::services::PhotoStore) write
/// operations. Reads never surface these; they degrade to empty results.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence engine could not be opened, or the store was closed.
    #[error("photo store is unavailable")]
    Unavailable,

    #[error("photo store database error: {0}")]
    Database(#[from] AppError),

    /// The blocking worker running the operation panicked or was cancelled.
    #[error("photo store task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(AppError::Database(err))
    }
}

/// Failure of an export run. Cancellation is not an error, see
/// [`ExportOutcome::Cancelled`](crate::models::ExportOutcome).
#[derive(Debug, Error)]
pub enum ExportError {
    /// Empty photo set or missing registration / inspection label.
    /// Checked before any photo is touched.
    #[error("export precondition failed: {0}")]
    Precondition(String),

    /// The finished surface could not be encoded.
    #[error("export encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("export could not read the photo store: {0}")]
    Store(#[from] StoreError),

    /// The output surface could not be allocated (zero or oversized).
    #[error("export surface error: {0}")]
    Surface(String),

    /// Another export is already running in this process.
    #[error("an export is already in progress")]
    Busy,

    #[error("export task failed: {0}")]
    Task(String),
}

impl ExportError {
    /// Stable code for hosts.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::Precondition(_) => "E_PRECONDITION",
            ExportError::Encode(_) => "E_ENCODE",
            ExportError::Store(_) => "E_STORE",
            ExportError::Surface(_) => "E_SURFACE",
            ExportError::Busy => "E_BUSY",
            ExportError::Task(_) => "E_TASK_FAILED",
        }
    }

    /// Whether retrying the same export can succeed without the user
    /// changing the selection or metadata.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExportError::Precondition(_))
    }
}

/// Error envelope returned by host commands.
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl CommandError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Database(_) => "E_DB_ERROR",
            AppError::Io(_) => "E_IO_ERROR",
            AppError::Image(_) => "E_IMAGE_ERROR",
            AppError::Json(_) => "E_JSON_ERROR",
            AppError::Config(_) => "E_CONFIG",
            AppError::NotFound(_) => "E_NOT_FOUND",
            AppError::General(_) => "E_GENERAL",
        };

        CommandError::new(code, err.to_string())
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Unavailable => "E_STORE_UNAVAILABLE",
            StoreError::Database(_) => "E_DB_ERROR",
            StoreError::Task(_) => "E_TASK_FAILED",
        };

        CommandError::new(code, err.to_string())
    }
}

impl From<ExportError> for CommandError {
    fn from(err: ExportError) -> Self {
        CommandError::new(err.code(), err.to_string())
    }
}

/// Result alias for general operations.
pub type AppResult<T> = Result<T, AppError>;

/// Result alias for photo store writes.
pub type StoreResult<T> = Result<T, StoreError>;
