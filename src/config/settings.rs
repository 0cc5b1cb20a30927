use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "FolderMirror";
const CONFIG_FILE: &str = "config.json";

/// Keys written by older releases, mapped to their current names.
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("extensions", "filter"),
    ("keep_extensions", "keep_ext"),
    ("copy_contents", "copy_content"),
    ("source_folder", "source"),
    ("destination_folder", "destination"),
];

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "foldermirror", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the configuration file.
pub fn get_config_file_path() -> Option<PathBuf> {
    get_config_directory().map(|dir| dir.join(CONFIG_FILE))
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the settings from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults. A corrupted file is logged and also
/// yields the defaults, so a bad settings file never prevents a start.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = resolve_path(path)?;

    if !config_path.exists() {
        tracing::info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(AppConfig::default());
    }

    let config_content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                "Failed to read config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            return Ok(AppConfig::default());
        }
    };

    match parse_config(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            Ok(AppConfig::default())
        }
    }
}

/// Parses settings JSON, migrating keys from the older format first.
fn parse_config(config_content: &str) -> Result<AppConfig> {
    let value: Value = serde_json::from_str(config_content)?;
    let migrated = migrate_legacy_config(value)?;
    Ok(serde_json::from_value(migrated)?)
}

/// Renames legacy keys to their current names.
///
/// A current key always wins over its legacy counterpart. Empty legacy
/// folder paths are dropped so they load as "not selected".
fn migrate_legacy_config(mut value: Value) -> Result<Value> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Config is not a JSON object"))?;

    for (legacy, current) in LEGACY_KEYS {
        if let Some(old_value) = obj.remove(*legacy) {
            if !obj.contains_key(*current) {
                tracing::debug!("Migrating legacy config key '{}' to '{}'", legacy, current);
                obj.insert((*current).to_string(), old_value);
            }
        }
    }

    for key in ["source", "destination"] {
        if obj.get(key).and_then(Value::as_str) == Some("") {
            obj.remove(key);
        }
    }

    Ok(value)
}

/// Saves the settings to `path`, or to the default location when `None`.
pub fn save_config(config: &AppConfig, path: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(path)?;

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)
        .with_context(|| format!("Failed to write config to {:?}", config_path))?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

/// Exports the current settings to a user-chosen preset file.
pub fn export_preset(config: &AppConfig, export_path: &Path) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(export_path, config_json)
        .with_context(|| format!("Failed to write preset to {:?}", export_path))?;
    tracing::info!("Preset saved to {:?}", export_path);
    Ok(())
}

/// Imports settings from a user-chosen preset file.
///
/// Unlike [`load_config`], a malformed preset is reported to the caller.
pub fn import_preset(import_path: &Path) -> Result<AppConfig> {
    let config_content = fs::read_to_string(import_path)
        .with_context(|| format!("Failed to read preset {:?}", import_path))?;
    let config = parse_config(&config_content)
        .with_context(|| format!("Malformed preset {:?}", import_path))?;
    tracing::info!("Preset loaded from {:?}", import_path);
    Ok(config)
}
