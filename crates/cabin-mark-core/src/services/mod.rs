//! Core services.

pub mod export;
pub mod settings;
pub mod store;
pub mod thumbnail;

pub use export::text::GlyphSource;
pub use export::ExportCompositor;
pub use settings::SettingsManager;
pub use store::PhotoStore;
pub use thumbnail::ThumbnailProjector;
