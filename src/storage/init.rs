//! Storage initialization
//!
//! Handles first-run setup: directories, settings file, and empty tables.

use crate::config::paths::FedhaPaths;
use crate::config::settings::Settings;
use crate::error::FedhaResult;

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Existing settings and tables are left untouched.
pub fn initialize_storage(paths: &FedhaPaths) -> FedhaResult<Settings> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    storage.save_all()?;

    tracing::info!(path = %paths.base_dir().display(), "storage initialized");
    Ok(settings)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &FedhaPaths) -> bool {
    !paths.settings_file().exists()
}
