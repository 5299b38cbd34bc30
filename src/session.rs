//! A single editing session over one animal file
//!
//! The [`Session`] ties the in-memory [`RecordStore`] to the XML file it
//! belongs to and to the [`Preferences`] that remember the last used file
//! between runs.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{AnimalRecord, RecordStore, StoreError},
    storage::{self, LoadError, Preferences, SaveError},
};

/// The preferences key holding the last loaded or saved file.
pub const FILE_PATH_KEY: &str = "filePath";

const APP_TITLE: &str = "AnimalFeedingApp";

/// The result of a [`Session::save`] request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The records were written to the given file.
    Saved(PathBuf),
    /// The session has no file yet; the caller must ask for a destination and
    /// call [`Session::save_as`].
    NeedsPath,
}

/// The remembered file could not be loaded when the session started.
#[derive(Debug, thiserror::Error)]
#[error("could not load data from file {}", path.display())]
pub struct StartupWarning {
    /// The remembered file.
    pub path: PathBuf,
    /// Why loading failed.
    #[source]
    pub source: LoadError,
}

/// The records being edited, the file they belong to, and the preferences
/// remembering that file.
#[derive(Debug)]
pub struct Session<P> {
    store: RecordStore,
    prefs: P,
}

impl<P: Preferences> Session<P> {
    /// Starts a session with the sample records, then tries to load the file
    /// remembered in `prefs`.
    ///
    /// A remembered file that no longer exists is ignored silently. Any other
    /// failure is returned as a warning; the sample records stay in place.
    #[must_use]
    #[instrument(skip_all)]
    pub fn start(prefs: P) -> (Self, Option<StartupWarning>) {
        let mut session = Self {
            store: RecordStore::with_sample_data(),
            prefs,
        };

        let Some(path) = session.remembered_path() else {
            return (session, None);
        };

        let warning = match session.open(&path) {
            Ok(()) => None,
            Err(LoadError::NotFound) => {
                tracing::debug!("remembered file {} does not exist", path.display());
                None
            }
            Err(source) => {
                tracing::warn!("failed to load remembered file {}: {source}", path.display());
                Some(StartupWarning { path, source })
            }
        };

        (session, warning)
    }

    /// The file path remembered in the preferences, if any.
    #[must_use]
    pub fn remembered_path(&self) -> Option<PathBuf> {
        self.prefs.get(FILE_PATH_KEY).map(PathBuf::from)
    }

    /// The records of this session.
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Mutable access to the records, e.g. to subscribe to changes.
    pub const fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// The preferences backing this session.
    #[must_use]
    pub const fn preferences(&self) -> &P {
        &self.prefs
    }

    /// Starts over with no records and no file.
    pub fn new_file(&mut self) {
        self.store.replace_all(Vec::new());
        self.store.clear_dirty();
        self.forget_path();
    }

    /// Replaces the records with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns the load failure. The records, the current file and the
    /// preferences are left untouched.
    #[instrument(skip(self))]
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        let records = storage::load(path)?;
        self.store.replace_all(records);
        self.store.clear_dirty();
        self.remember_path(path);
        Ok(())
    }

    /// Writes the records to the current file.
    ///
    /// Returns [`SaveOutcome::NeedsPath`] without writing anything if the
    /// session has no file yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The records stay dirty.
    pub fn save(&mut self) -> Result<SaveOutcome, SaveError> {
        match self.store.current_file_path().map(Path::to_path_buf) {
            Some(path) => self.write(path),
            None => Ok(SaveOutcome::NeedsPath),
        }
    }

    /// Writes the records to `path` and makes it the current file.
    ///
    /// `.xml` is appended if `path` does not already end with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The current file is
    /// left unchanged.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<SaveOutcome, SaveError> {
        self.write(with_xml_extension(path.into()))
    }

    /// Appends a record. See [`RecordStore::add`].
    pub fn add(&mut self, record: AnimalRecord) -> usize {
        self.store.add(record)
    }

    /// Replaces a record in place. See [`RecordStore::update`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfRange`] if there is no such record.
    pub fn update(
        &mut self,
        index: usize,
        record: AnimalRecord,
    ) -> Result<AnimalRecord, StoreError> {
        self.store.update(index, record)
    }

    /// Removes a record. See [`RecordStore::remove`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfRange`] if there is no such record.
    pub fn remove(&mut self, index: usize) -> Result<AnimalRecord, StoreError> {
        self.store.remove(index)
    }

    /// Whether the user should be asked to save before exiting.
    #[must_use]
    pub const fn needs_save_prompt(&self) -> bool {
        self.store.is_dirty()
    }

    /// The window title: the application name, followed by the current file
    /// name if there is one.
    #[must_use]
    pub fn title(&self) -> String {
        self.store
            .current_file_path()
            .and_then(Path::file_name)
            .map_or_else(
                || APP_TITLE.to_string(),
                |name| format!("{APP_TITLE} - {}", name.to_string_lossy()),
            )
    }

    #[instrument(skip(self))]
    fn write(&mut self, path: PathBuf) -> Result<SaveOutcome, SaveError> {
        storage::save(self.store.records(), &path)?;
        self.store.clear_dirty();
        self.remember_path(&path);
        Ok(SaveOutcome::Saved(path))
    }

    fn remember_path(&mut self, path: &Path) {
        self.store.set_current_file_path(Some(path.to_path_buf()));
        if let Err(e) = self.prefs.set(FILE_PATH_KEY, &path.to_string_lossy()) {
            tracing::warn!("failed to remember file path: {e}");
        }
    }

    fn forget_path(&mut self) {
        self.store.set_current_file_path(None);
        if let Err(e) = self.prefs.remove(FILE_PATH_KEY) {
            tracing::warn!("failed to forget file path: {e}");
        }
    }
}

fn with_xml_extension(path: PathBuf) -> PathBuf {
    if path.extension() == Some(OsStr::new("xml")) {
        path
    } else {
        let mut path = path.into_os_string();
        path.push(".xml");
        PathBuf::from(path)
    }
}
