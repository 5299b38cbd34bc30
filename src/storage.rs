/// XML serialization of animal records.
pub mod xml;
mod preferences;

pub use preferences::{MemoryPreferences, Preferences, PreferencesError, TomlPreferences};
pub use xml::{load, save, LoadError, ParseError, SaveError};
