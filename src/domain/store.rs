//! In-memory store of animal records
//!
//! The [`RecordStore`] knows nothing about the filesystem. It holds the
//! ordered records of the current session, tracks whether they have been
//! modified since the last load or save, and remembers which file they belong
//! to.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::instrument;

use crate::domain::AnimalRecord;

/// Errors that can occur when mutating the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists at the requested position.
    #[error("no animal selected (index {index}, store holds {len} records)")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The number of records in the store at the time of the request.
        len: usize,
    },
}

/// A change notification emitted after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A record was appended at the given position.
    Added(usize),
    /// The record at the given position was replaced.
    Updated(usize),
    /// The record at the given position was removed.
    Removed(usize),
    /// The whole sequence was replaced.
    Replaced,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// The ordered collection of animal records for the current session.
///
/// Insertion order is display order.
#[derive(Default)]
pub struct RecordStore {
    records: Vec<AnimalRecord>,
    dirty: bool,
    current_file_path: Option<PathBuf>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.records)
            .field("dirty", &self.dirty)
            .field("current_file_path", &self.current_file_path)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl RecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the first-run sample records.
    ///
    /// The store is not dirty and has no file path.
    #[must_use]
    pub fn with_sample_data() -> Self {
        Self {
            records: AnimalRecord::sample_data(),
            ..Self::default()
        }
    }

    /// The records in display order.
    #[must_use]
    pub fn records(&self) -> &[AnimalRecord] {
        &self.records
    }

    /// Returns the record at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AnimalRecord> {
        self.records.get(index)
    }

    /// The number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record to the end of the sequence and returns its position.
    #[instrument(level = "debug", skip_all, fields(species = %record.species))]
    pub fn add(&mut self, record: AnimalRecord) -> usize {
        self.records.push(record);
        let index = self.records.len() - 1;
        self.dirty = true;
        self.notify(StoreEvent::Added(index));
        index
    }

    /// Replaces the record at `index` in place and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfRange`] if there is no record at
    /// `index`. The store is left unchanged.
    #[instrument(level = "debug", skip(self, record))]
    pub fn update(
        &mut self,
        index: usize,
        record: AnimalRecord,
    ) -> Result<AnimalRecord, StoreError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        let previous = std::mem::replace(slot, record);
        self.dirty = true;
        self.notify(StoreEvent::Updated(index));
        Ok(previous)
    }

    /// Removes the record at `index`, shifting subsequent records down.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfRange`] if there is no record at
    /// `index`. The store is left unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, index: usize) -> Result<AnimalRecord, StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        self.dirty = true;
        self.notify(StoreEvent::Removed(index));
        Ok(removed)
    }

    /// Discards the current records and adopts `records` verbatim.
    ///
    /// This does not touch the dirty flag. Callers establishing a clean
    /// baseline (after a load, or for a new file) call
    /// [`Self::clear_dirty`] afterwards.
    #[instrument(level = "debug", skip_all, fields(count = records.len()))]
    pub fn replace_all(&mut self, records: Vec<AnimalRecord>) {
        self.records = records;
        self.notify(StoreEvent::Replaced);
    }

    /// Returns `true` if the records were modified since the last load or save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets the modification flag.
    pub const fn mark_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Clears the modification flag.
    pub const fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// The file the records were last loaded from or saved to.
    ///
    /// `None` means there is no known target, so a save has to ask for one.
    #[must_use]
    pub fn current_file_path(&self) -> Option<&Path> {
        self.current_file_path.as_deref()
    }

    /// Sets or clears the current file path.
    pub fn set_current_file_path(&mut self, path: Option<PathBuf>) {
        self.current_file_path = path;
    }

    /// Registers a listener that is called after every successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: StoreEvent) {
        tracing::trace!(?event, "store changed");
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}
