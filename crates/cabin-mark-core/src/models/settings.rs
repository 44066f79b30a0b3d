//! Application settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Thumbnail projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThumbnailSettings {
    /// Longest edge of a thumbnail, in pixels
    pub max_edge: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            max_edge: 250,
            quality: 50,
        }
    }
}

/// Composite export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub canvas_width: u32,
    pub padding: u32,
    pub header_height: u32,
    /// Band under each photo holding its door label
    pub label_height: u32,
    pub gap: u32,
    pub footer_height: u32,
    /// JPEG quality of the artifact (1-100)
    pub jpeg_quality: u8,
    /// Layout y values closer than this are treated as one row
    pub row_epsilon: f64,
    /// Yield to the runtime after this many photos (0 = never)
    pub yield_every: usize,
    /// Fixed text printed in the footer
    pub branding: String,
    /// Optional TrueType/OpenType font for labels
    pub font_path: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1600,
            padding: 40,
            header_height: 200,
            label_height: 60,
            gap: 40,
            footer_height: 100,
            jpeg_quality: 85,
            row_epsilon: 2.0,
            yield_every: 5,
            branding: String::from("CABIN AUTO MARK SYSTEM"),
            font_path: None,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Use SQLite WAL journaling
    pub enable_wal: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { enable_wal: true }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub thumbnail: ThumbnailSettings,
    pub export: ExportSettings,
    pub storage: StorageSettings,
    /// JSON layout catalog replacing the built-in one
    pub layout_path: Option<PathBuf>,
}
