// Registry settings engine
// Loads, saves and updates the settings file. Settings live in a JSON file at
// the platform config path unless a path is given explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::RegistrySettings;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "TABWARDEN_CONFIG";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<RegistrySettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &RegistrySettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine that persists [`RegistrySettings`] as JSON on disk.
#[derive(Debug)]
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: RegistrySettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `settings.json` in the
    /// platform config directory. Nothing is read until [`load`](SettingsEngineTrait::load).
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self {
            config_path,
            settings: RegistrySettings::default(),
        }
    }

    /// Honours the `TABWARDEN_CONFIG` environment variable.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Engine holding `settings` in memory, writing to `path` on change.
    pub fn with_settings(path: PathBuf, settings: RegistrySettings) -> Self {
        Self {
            config_path: path,
            settings,
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// A missing file yields the defaults; a malformed one is an error.
    fn load(&mut self) -> Result<RegistrySettings, SettingsError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no settings file, using defaults");
            self.settings = RegistrySettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("failed to read settings file: {}", e)))?;
        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("failed to parse settings file: {}", e))
        })?;

        info!(path = %self.config_path.display(), "settings loaded");
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("failed to create settings directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("failed to serialize settings: {}", e))
        })?;
        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("failed to write settings file: {}", e)))
    }

    fn get_settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Updates one setting by dot path (`"windows.close_when_empty"`) and
    /// saves. The whole document is re-validated before it is accepted.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(SettingsError::InvalidKey(format!("'{}'", key)));
        }

        let mut document = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("failed to serialize settings: {}", e))
        })?;
        let pointer = format!("/{}", key.replace('.', "/"));
        let slot = document
            .pointer_mut(&pointer)
            .ok_or_else(|| SettingsError::InvalidKey(format!("'{}' is not a known setting", key)))?;
        if slot.is_object() {
            return Err(SettingsError::InvalidKey(format!("'{}' is a section, not a setting", key)));
        }
        *slot = value;

        self.settings = serde_json::from_value(document).map_err(|e| {
            SettingsError::InvalidValue(format!("'{}': {}", key, e))
        })?;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = RegistrySettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
