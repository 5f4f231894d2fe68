use crate::constants::{SETTINGS_DIR_NAME, SETTINGS_FILE_NAME};
use crate::error::{Result, SqueezeError};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// User preferences remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_folder: Option<String>,
}

impl Settings {
    /// Copies every key set in `patch` over this one.
    pub fn apply(&mut self, patch: Settings) {
        if patch.api_key.is_some() {
            self.api_key = patch.api_key;
        }
        if patch.output_folder.is_some() {
            self.output_folder = patch.output_folder;
        }
        if patch.input_folder.is_some() {
            self.input_folder = patch.input_folder;
        }
    }

    /// API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

pub trait SettingsStore {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;

    /// Merges `patch` into what is stored and writes it back immediately.
    fn update(&self, patch: Settings) -> Result<Settings> {
        let mut settings = self.load()?;
        settings.apply(patch);
        self.save(&settings)?;
        Ok(settings)
    }
}

/// Settings kept as a JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/photo-squeeze/settings.json`, falling back to the
    /// working directory when the platform has no config directory.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join(SETTINGS_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Settings::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|_| SqueezeError::DirectoryCreationFailed(parent.to_path_buf()))?;
        }
        let text = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, text)?;
        tracing::debug!("settings written to {}", self.path.display());
        Ok(())
    }
}

/// Settings held in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: RefCell<Settings>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(settings),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.settings.borrow().clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.settings.borrow_mut() = settings.clone();
        Ok(())
    }
}
