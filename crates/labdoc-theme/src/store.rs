//! Persistence of the theme preference.
//!
//! The preference is a single string stored under [`PREFERENCE_KEY`]. The
//! file-backed store writes it into a small TOML document and leaves any
//! other keys in that document untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::preference::ThemePreference;

/// Key under which the preference is stored.
pub const PREFERENCE_KEY: &str = "lab-theme";

/// Errors from loading or saving the preference.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preference file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Somewhere the theme preference can be kept between runs.
pub trait PreferenceStore {
    /// The stored preference, or `None` if nothing usable is stored.
    fn load(&self) -> Result<Option<ThemePreference>, ThemeError>;

    /// Replace the stored preference.
    fn save(&self, preference: ThemePreference) -> Result<(), ThemeError>;
}

/// Load the stored preference, defaulting to `auto`.
///
/// Store failures are logged and treated like an absent value.
pub fn load_or_default(store: &dyn PreferenceStore) -> ThemePreference {
    match store.load() {
        Ok(Some(preference)) => preference,
        Ok(None) => ThemePreference::default(),
        Err(e) => {
            tracing::warn!("could not load theme preference: {e}");
            ThemePreference::default()
        }
    }
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a raw value, valid or not.
    pub fn with_raw(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<ThemePreference>, ThemeError> {
        let value = self.value.lock().unwrap_or_else(|e| e.into_inner());
        Ok(value.as_deref().and_then(parse_stored))
    }

    fn save(&self, preference: ThemePreference) -> Result<(), ThemeError> {
        let mut value = self.value.lock().unwrap_or_else(|e| e.into_inner());
        *value = Some(preference.as_str().to_string());
        Ok(())
    }
}

/// Stores the preference in a TOML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/labdoc/preferences.toml`.
    pub fn default_location() -> Result<Self, ThemeError> {
        Self::default_path().map(Self::new)
    }

    pub fn default_path() -> Result<PathBuf, ThemeError> {
        dirs::config_dir()
            .map(|dir| dir.join("labdoc").join("preferences.toml"))
            .ok_or(ThemeError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Option<toml::Table>, ThemeError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ThemeError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ThemeError::Parse {
                path: self.path.clone(),
                source,
            })
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Option<ThemePreference>, ThemeError> {
        let Some(table) = self.read_table()? else {
            return Ok(None);
        };

        Ok(table
            .get(PREFERENCE_KEY)
            .and_then(|value| value.as_str())
            .and_then(parse_stored))
    }

    fn save(&self, preference: ThemePreference) -> Result<(), ThemeError> {
        let mut table = self.read_table()?.unwrap_or_default();
        table.insert(
            PREFERENCE_KEY.to_string(),
            toml::Value::String(preference.as_str().to_string()),
        );
        let contents = toml::to_string(&table)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ThemeError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, contents).map_err(|source| ThemeError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), %preference, "saved theme preference");
        Ok(())
    }
}

fn parse_stored(raw: &str) -> Option<ThemePreference> {
    match raw.parse() {
        Ok(preference) => Some(preference),
        Err(e) => {
            tracing::warn!("ignoring stored theme preference: {e}");
            None
        }
    }
}
