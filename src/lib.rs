//! codesnap
//!
//! Turn a snippet of source code into a PNG snapshot. codesnap keeps the
//! editor settings (theme, language, tab size, line numbers and the code
//! itself) in durable storage and renders the highlighted block to an image
//! on demand.
//!
//! # Features
//!
//! - **Persistent settings**: every change rewrites one JSON snapshot; missing
//!   or malformed fields fall back to defaults on load
//! - **Pluggable collaborators**: storage, highlighting, rasterization and
//!   download delivery are traits with in-memory implementations for tests
//! - **bitmap** (default): built-in rasterizer that encodes PNG
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use codesnap::{App, AppConfig, DirectorySink, FileStorage};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileStorage::open(FileStorage::default_root()?)?;
//! let mut app = App::new(AppConfig::default(), storage, Arc::new(DirectorySink::new(".")))?;
//! app.set_theme("dracula")?;
//! app.type_text("fn main() {}");
//! println!("{:?}", app.snap());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod app;
pub mod editor;
pub mod export;
pub mod highlight;
pub mod languages;
pub mod rendering;
pub mod settings;
pub mod storage;
pub mod themes;

pub use app::App;
pub use editor::{Editor, Key, KeyOutcome};
pub use export::{DataUri, DirectorySink, DownloadSink, ExportOutcome, ExportPipeline, MemorySink};
pub use rendering::{RasterOptions, Rasterizer, Screenshot};
pub use settings::{SettingsField, SettingsRecord, SettingsStore, TabSize};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Storage key holding the settings snapshot
pub const DEFAULT_STORAGE_KEY: &str = "__STORAGE_KEY";

/// Selector of the rendered code block
pub const DEFAULT_TARGET_SELECTOR: &str = ".code-box";

/// Configuration shared by the settings store and the export pipeline
///
/// # Examples
///
/// ```
/// let cfg = codesnap::AppConfig::default();
/// assert_eq!(cfg.target_selector, ".code-box");
/// assert!(cfg.raster.use_cors);
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Key holding the settings snapshot
    pub storage_key: String,
    /// CSS selector of the element to export
    pub target_selector: String,
    /// Options handed to the rasterizer
    pub raster: RasterOptions,
    /// Directory exported images are written to (the working directory when unset)
    pub download_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            target_selector: DEFAULT_TARGET_SELECTOR.to_string(),
            raster: RasterOptions::default(),
            download_dir: None,
        }
    }
}

impl AppConfig {
    /// Sink writing into `download_dir`.
    pub fn download_sink(&self) -> DirectorySink {
        DirectorySink::new(self.download_dir.clone().unwrap_or_else(|| PathBuf::from(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage_key, "__STORAGE_KEY");
        assert!(config.raster.allow_taint);
        assert_eq!(config.raster.scale, 1);
        assert!(config.download_dir.is_none());
    }
}
