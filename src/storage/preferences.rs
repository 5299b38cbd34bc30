//! Key-value preferences, used to remember the last opened file.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A string key-value store that survives between sessions.
pub trait Preferences {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError>;

    /// Removes the value stored under `key`. Removing a missing key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<(), PreferencesError>;
}

/// Errors that can occur when reading or writing preferences.
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    /// The preferences file could not be read or written.
    #[error("failed to access preferences file {}", path.display())]
    Io {
        /// The preferences file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The preferences file is not valid TOML.
    #[error("failed to parse preferences file")]
    Parse(#[from] toml::de::Error),
    /// The preferences could not be serialized.
    #[error("failed to serialize preferences")]
    Serialize(#[from] toml::ser::Error),
}

/// Preferences held in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    /// Creates an empty set of preferences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferencesError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Preferences persisted to a TOML file.
///
/// Every change is written through to disk immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TomlPreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferences {
    /// Opens the preferences file at `path`.
    ///
    /// A missing file yields empty preferences; it is created on the first
    /// change.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<Versions>(&content)?.into(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no preferences file at {}", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(PreferencesError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// The file the preferences are stored in.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PreferencesError> {
        let content = toml::to_string_pretty(&Versions::from(self.values.clone()))?;
        std::fs::write(&self.path, content).map_err(|source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Preferences for TomlPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferencesError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The serialized versions of the preferences file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        values: BTreeMap<String, String>,
    },
}

impl From<Versions> for BTreeMap<String, String> {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { values } => values,
        }
    }
}

impl From<BTreeMap<String, String>> for Versions {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self::V1 { values }
    }
}
