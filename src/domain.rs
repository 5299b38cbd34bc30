//! Domain models for the feeding inventory.
//!
//! This module contains the animal record, the in-memory record store and
//! the validation rules applied to edit-form input.

/// Animal record model and sample data.
pub mod record;
pub use record::{AnimalRecord, REORDER_CHOICES};

mod store;
pub use store::{RecordStore, StoreError, StoreEvent};

mod validation;
pub use validation::{FieldError, RawRecord, RecordValidator, ValidationErrors};

/// Display formatting and form-input parsing for reorder dates.
pub mod date;
