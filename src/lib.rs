//! Livestock Feeding Inventory
//!
//! Animal feeding records are kept in an ordered in-memory store and
//! persisted to a single XML file per session.

pub mod domain;
pub use domain::{
    AnimalRecord, FieldError, RawRecord, RecordStore, RecordValidator, StoreError, StoreEvent,
    ValidationErrors,
};

/// XML file storage and the last-used-path preferences.
pub mod storage;
pub use storage::{
    LoadError, MemoryPreferences, ParseError, Preferences, PreferencesError, SaveError,
    TomlPreferences,
};

mod session;
pub use session::{FILE_PATH_KEY, SaveOutcome, Session, StartupWarning};
