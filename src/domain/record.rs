use chrono::NaiveDate;

/// The choices offered for the "reorder needed" field of the edit form.
///
/// Storage keeps the field as free text, so loaded records may hold other
/// values.
pub const REORDER_CHOICES: [&str; 2] = ["Ja", "Nein"];

/// One animal's feeding-inventory entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalRecord {
    /// The animal species, e.g. "Rind".
    pub species: String,
    /// The kind of feed, e.g. "Mais".
    pub feed_type: String,
    /// The amount of feed currently in stock, measured in [`Self::unit`].
    pub current_stock: f64,
    /// The unit the stock is measured in, e.g. "Kg".
    pub unit: String,
    /// Whether a reorder is needed. Usually one of [`REORDER_CHOICES`].
    pub reorder_needed: String,
    /// The date the feed was (or should be) reordered, if any.
    pub reorder_date: Option<NaiveDate>,
}

impl AnimalRecord {
    /// Creates a record for the given species and feed type, filled with the
    /// sample defaults used for first-run data.
    #[must_use]
    pub fn sample(species: impl Into<String>, feed_type: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            feed_type: feed_type.into(),
            current_stock: 50.5,
            unit: "Kg".to_string(),
            reorder_needed: "Ja, Nein".to_string(),
            reorder_date: NaiveDate::from_ymd_opt(1999, 2, 21),
        }
    }

    /// The records a fresh session starts with, in display order.
    #[must_use]
    pub fn sample_data() -> Vec<Self> {
        [
            ("Rind", "Mais"),
            ("Kalb", "Heu"),
            ("Pferd", "Gras"),
            ("Pony", "Hafer"),
            ("Schwein", "Grünfutter"),
            ("Huhn", "Körner"),
            ("Strauss", "Körner"),
        ]
        .into_iter()
        .map(|(species, feed_type)| Self::sample(species, feed_type))
        .collect()
    }

    /// Returns `true` if the record is flagged for reordering.
    #[must_use]
    pub fn needs_reorder(&self) -> bool {
        self.reorder_needed.trim() == REORDER_CHOICES[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_uses_first_run_defaults() {
        let record = AnimalRecord::sample("Rind", "Mais");

        assert_eq!(record.species, "Rind");
        assert_eq!(record.feed_type, "Mais");
        assert!((record.current_stock - 50.5).abs() < f64::EPSILON);
        assert_eq!(record.unit, "Kg");
        assert_eq!(record.reorder_needed, "Ja, Nein");
        assert_eq!(record.reorder_date, NaiveDate::from_ymd_opt(1999, 2, 21));
    }

    #[test]
    fn sample_data_order() {
        let species: Vec<_> = AnimalRecord::sample_data()
            .into_iter()
            .map(|r| r.species)
            .collect();

        assert_eq!(
            species,
            ["Rind", "Kalb", "Pferd", "Pony", "Schwein", "Huhn", "Strauss"]
        );
    }

    #[test]
    fn needs_reorder_only_for_yes() {
        let mut record = AnimalRecord::sample("Huhn", "Körner");
        assert!(!record.needs_reorder());

        record.reorder_needed = "Ja".to_string();
        assert!(record.needs_reorder());

        record.reorder_needed = "Nein".to_string();
        assert!(!record.needs_reorder());
    }
}
