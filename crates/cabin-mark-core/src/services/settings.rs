//! Settings file handling.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppSettings;
use crate::paths::PathProvider;
use crate::utils::error::AppError;

/// Reads and writes `settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    pub fn new(provider: &dyn PathProvider) -> Result<Self, AppError> {
        Self::from_path(provider.settings_path())
    }

    pub fn from_path(settings_path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = settings_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create config directory: {}", e)))?;
        }

        Ok(Self { settings_path })
    }

    /// Load settings. A missing file yields the defaults; missing keys
    /// take their default values.
    pub fn load(&self) -> Result<AppSettings, AppError> {
        if !self.settings_path.exists() {
            tracing::info!("No settings file, using defaults");
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)
            .map_err(|e| AppError::Config(format!("cannot read settings file: {}", e)))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("malformed settings file: {}", e)))?;

        tracing::info!("Loaded settings from {:?}", self.settings_path);
        Ok(settings)
    }

    /// Load settings, falling back to defaults (with a warning) when the
    /// file cannot be read or parsed.
    pub fn load_or_default(&self) -> AppSettings {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring settings file: {}", e);
            AppSettings::default()
        })
    }

    pub fn save(&self, settings: &AppSettings) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Config(format!("cannot serialize settings: {}", e)))?;

        fs::write(&self.settings_path, content)
            .map_err(|e| AppError::Config(format!("cannot write settings file: {}", e)))?;

        tracing::info!("Saved settings to {:?}", self.settings_path);
        Ok(())
    }

    pub fn reset(&self) -> Result<AppSettings, AppError> {
        let defaults = AppSettings::default();
        self.save(&defaults)?;
        Ok(defaults)
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }
}
