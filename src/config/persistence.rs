//! Settings file persistence for Scribe
//!
//! This module handles loading and saving the settings file in a
//! platform-specific directory, falling back to defaults whenever the file
//! is missing or unreadable.

use crate::config::EditorSettings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "scribe";

/// Settings file name
const CONFIG_FILE_NAME: &str = "settings.json";

/// Backup file name (used during atomic writes)
const CONFIG_BACKUP_NAME: &str = "settings.json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\scribe\`
/// - **macOS**: `~/Library/Application Support/scribe/`
/// - **Linux**: `~/.config/scribe/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the settings file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Ensure `dir` exists, creating it if necessary.
fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        debug!("Creating config directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
            path: dir.to_path_buf(),
            source: Box::new(e),
        })?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from the default location.
///
/// A missing or empty file yields defaults. A corrupted file is logged and
/// also yields defaults.
pub fn load_config() -> EditorSettings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(EditorSettings::default(), "Failed to load settings")
}

/// Load and sanitize settings from an explicit file path.
///
/// # Errors
///
/// - `Error::ConfigLoad`: The file exists but cannot be read
/// - `Error::ConfigParse`: The file is not valid settings JSON
pub fn load_config_from(path: &Path) -> Result<EditorSettings> {
    if !path.exists() {
        debug!("Settings file not found at {}, using defaults", path.display());
        return Ok(EditorSettings::default());
    }

    debug!("Loading settings from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Settings file is empty, using defaults");
        return Ok(EditorSettings::default());
    }

    let settings = EditorSettings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Settings file at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse settings file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Settings loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Save settings to the default location.
pub fn save_config(settings: &EditorSettings) -> Result<()> {
    save_config_to(settings, &get_config_dir()?)
}

/// Save settings into `dir`, creating it if needed.
///
/// The JSON is written to a backup file first and then renamed over the
/// settings file, so a crash mid-write never leaves a truncated file.
pub fn save_config_to(settings: &EditorSettings, dir: &Path) -> Result<()> {
    ensure_dir(dir)?;
    let config_path = dir.join(CONFIG_FILE_NAME);
    let backup_path = dir.join(CONFIG_BACKUP_NAME);

    debug!("Saving settings to: {}", config_path.display());

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, &config_path).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    info!("Settings saved to {}", config_path.display());
    Ok(())
}

/// Save settings, logging instead of returning errors.
///
/// Returns `true` if the save was successful.
pub fn save_config_silent(settings: &EditorSettings) -> bool {
    match save_config(settings) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save settings: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
