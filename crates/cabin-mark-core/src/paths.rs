//! Where the application keeps its files.
//!
//! Layout under the data directory:
//!
//! ```text
//! <app data>/
//!   Config/settings.json
//!   Database/cabin_mark.db
//!   Logs/
//!   Exports/
//! ```

use std::path::PathBuf;
use std::sync::Arc;

/// Resolves application data paths.
pub trait PathProvider: Send + Sync {
    /// Root application data directory.
    fn app_data_dir(&self) -> PathBuf;

    fn database_dir(&self) -> PathBuf {
        self.app_data_dir().join("Database")
    }

    fn database_path(&self) -> PathBuf {
        self.database_dir().join("cabin_mark.db")
    }

    fn settings_path(&self) -> PathBuf {
        self.app_data_dir().join("Config").join("settings.json")
    }

    fn logs_dir(&self) -> PathBuf {
        self.app_data_dir().join("Logs")
    }

    /// Default destination for export artifacts.
    fn exports_dir(&self) -> PathBuf {
        self.app_data_dir().join("Exports")
    }
}

pub type SharedPathProvider = Arc<dyn PathProvider>;

/// Platform data directory, `CabinAutoMark` under `dirs::data_dir()`.
#[derive(Debug, Clone)]
pub struct AppPathProvider {
    app_data_dir: PathBuf,
}

impl AppPathProvider {
    pub fn new() -> Self {
        let app_data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("CabinAutoMark");
        Self { app_data_dir }
    }

    /// Use `base_dir` as the data directory (`--data-dir`, tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            app_data_dir: base_dir,
        }
    }
}

impl Default for AppPathProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PathProvider for AppPathProvider {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data_dir.clone()
    }
}
