//! Validation of edit-form input.

use std::fmt;

use chrono::NaiveDate;
use nonempty::NonEmpty;
use thiserror::Error;

use crate::domain::AnimalRecord;

/// The raw field values of a candidate record, as collected by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// The species text.
    pub species: String,
    /// The feed type text.
    pub feed_type: String,
    /// The current stock as typed, not yet parsed.
    pub current_stock: String,
    /// The unit text.
    pub unit: String,
    /// The reorder choice.
    pub reorder_needed: String,
    /// The picked reorder date.
    pub reorder_date: Option<NaiveDate>,
}

impl From<&AnimalRecord> for RawRecord {
    fn from(record: &AnimalRecord) -> Self {
        Self {
            species: record.species.clone(),
            feed_type: record.feed_type.clone(),
            current_stock: record.current_stock.to_string(),
            unit: record.unit.clone(),
            reorder_needed: record.reorder_needed.clone(),
            reorder_date: record.reorder_date,
        }
    }
}

/// A single problem with one field of a candidate record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The species is empty.
    #[error("invalid input in field 'Species': must not be empty")]
    EmptySpecies,
    /// The feed type is empty.
    #[error("invalid input in field 'Feed type': must not be empty")]
    EmptyFeedType,
    /// The current stock is empty.
    #[error("invalid input in field 'Current stock': must not be empty")]
    EmptyCurrentStock,
    /// The current stock is not a finite number.
    #[error("invalid input in field 'Current stock': '{0}' is not a number")]
    NonNumericCurrentStock(String),
    /// The unit is empty.
    #[error("invalid input in field 'Unit': must not be empty")]
    EmptyUnit,
    /// The reorder date could not be understood.
    #[error("invalid input in field 'Reorder date': '{0}' is not a date")]
    InvalidReorderDate(String),
}

/// Every problem found with a candidate record, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(NonEmpty<FieldError>);

impl ValidationErrors {
    /// Wraps a list of errors, returning `None` if the list is empty.
    #[must_use]
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        NonEmpty::from_vec(errors).map(Self)
    }

    /// Iterates over the individual field errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// The number of field errors. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; provided for symmetry with [`Self::len`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks candidate records before they are accepted into the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    /// Validates the raw fields of a candidate record.
    ///
    /// All rules are checked, so the caller can report every problem at
    /// once. Text fields are trimmed in the returned record.
    ///
    /// # Errors
    ///
    /// Returns the complete list of field errors, ordered species, feed type,
    /// current stock, unit.
    pub fn validate(raw: &RawRecord) -> Result<AnimalRecord, ValidationErrors> {
        let mut errors = Vec::new();

        let species = raw.species.trim();
        if species.is_empty() {
            errors.push(FieldError::EmptySpecies);
        }

        let feed_type = raw.feed_type.trim();
        if feed_type.is_empty() {
            errors.push(FieldError::EmptyFeedType);
        }

        let current_stock = match parse_stock(&raw.current_stock) {
            Ok(stock) => stock,
            Err(e) => {
                errors.push(e);
                0.0
            }
        };

        let unit = raw.unit.trim();
        if unit.is_empty() {
            errors.push(FieldError::EmptyUnit);
        }

        if let Some(errors) = ValidationErrors::from_vec(errors) {
            tracing::debug!(count = errors.len(), "candidate record rejected");
            return Err(errors);
        }

        Ok(AnimalRecord {
            species: species.to_string(),
            feed_type: feed_type.to_string(),
            current_stock,
            unit: unit.to_string(),
            reorder_needed: raw.reorder_needed.trim().to_string(),
            reorder_date: raw.reorder_date,
        })
    }
}

fn parse_stock(input: &str) -> Result<f64, FieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FieldError::EmptyCurrentStock);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FieldError::NonNumericCurrentStock(trimmed.to_string())),
    }
}
