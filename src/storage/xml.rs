use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use chrono::NaiveDate;
use quick_xml::{events::Event, name::QName, Reader};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use crate::AnimalRecord;

const ROOT: &str = "animals";
const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Writes the records to `path` as a pretty-printed XML document.
///
/// The document is fully serialized before the file is touched, so a
/// serialization failure never leaves a truncated file behind.
///
/// # Errors
///
/// Returns an error if the records cannot be serialized or the file cannot be
/// created or written to.
#[instrument(skip(records), fields(count = records.len()))]
pub fn save(records: &[AnimalRecord], path: &Path) -> Result<(), SaveError> {
    let document = XmlDocument::from(records);
    let xml = document.to_xml()?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(xml.as_bytes())?;
    writer.flush()?;

    tracing::debug!("saved animal file");
    Ok(())
}

/// Reads the records stored at `path`.
///
/// The load is all-or-nothing: either every record is returned, or an error.
///
/// # Errors
///
/// - [`LoadError::NotFound`] if there is no file at `path`
/// - [`LoadError::Parse`] if the file is not a well-formed animal document
/// - [`LoadError::Io`] if the file exists but cannot be read
#[instrument]
pub fn load(path: &Path) -> Result<Vec<AnimalRecord>, LoadError> {
    let mut file = File::open(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let records = XmlDocument::read(&content)?.into_records();
    tracing::debug!(count = records.len(), "loaded animal file");
    Ok(records)
}

/// Errors that can occur when loading an animal file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// There is no file at the given path.
    #[error("animal file not found")]
    NotFound,
    /// The file exists but could not be read.
    #[error("failed to read animal file")]
    Io(#[from] io::Error),
    /// The file content is not a well-formed animal document.
    #[error("malformed animal file: {0}")]
    Parse(#[from] ParseError),
}

/// Ways in which a file's content can fail to be an animal document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document contains no root element.
    #[error("document has no root element")]
    MissingRoot,
    /// The root element is not `<animals>`.
    #[error("expected root element <animals>, found <{0}>")]
    UnexpectedRoot(String),
    /// Markup or text follows the closing `</animals>` tag.
    #[error("unexpected content after the root element")]
    TrailingContent,
    /// The document is not well-formed XML.
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),
    /// An element is missing or holds content of the wrong type.
    #[error(transparent)]
    Content(#[from] quick_xml::DeError),
}

/// Errors that can occur when saving an animal file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The file could not be created or written to.
    #[error("failed to write animal file")]
    Io(#[from] io::Error),
    /// The records could not be serialized.
    #[error("failed to serialize animal records")]
    Serialize(#[from] quick_xml::SeError),
}

/// The on-disk document: an `<animals>` root with one `<animal>` per record.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename = "animals")]
struct XmlDocument {
    #[serde(rename = "animal", default)]
    animals: Vec<XmlAnimal>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct XmlAnimal {
    #[serde(rename = "tierArt", default)]
    species: String,
    #[serde(rename = "futterArt", default)]
    feed_type: String,
    #[serde(rename = "aktuellerBestand")]
    current_stock: f64,
    #[serde(rename = "mengeneinheit", default)]
    unit: String,
    #[serde(rename = "bestellungnotwendig", default)]
    reorder_needed: String,
    #[serde(
        rename = "bestelldatum",
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    reorder_date: Option<NaiveDate>,
}

/// An empty `<bestelldatum/>` element means there is no date.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    match text.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl XmlDocument {
    fn to_xml(&self) -> Result<String, quick_xml::SeError> {
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 4);
        self.serialize(serializer)?;

        Ok(format!("{DECLARATION}\n{body}\n"))
    }

    fn read(content: &str) -> Result<Self, ParseError> {
        check_structure(content)?;
        Ok(quick_xml::de::from_str(content)?)
    }

    fn into_records(self) -> Vec<AnimalRecord> {
        self.animals.into_iter().map(AnimalRecord::from).collect()
    }
}

/// Ensures the document holds exactly one element, the `<animals>` root.
///
/// Only the prolog, comments and processing instructions may surround it.
fn check_structure(content: &str) -> Result<(), ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                check_root_name(element.name())?;
                let end = element.to_end().into_owned();
                reader.read_to_end(end.name())?;
                break;
            }
            Event::Empty(element) => {
                check_root_name(element.name())?;
                break;
            }
            Event::Decl(_) | Event::Comment(_) | Event::DocType(_) | Event::PI(_) => {}
            _ => return Err(ParseError::MissingRoot),
        }
    }

    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::PI(_) => {}
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            _ => return Err(ParseError::TrailingContent),
        }
    }
}

fn check_root_name(name: QName<'_>) -> Result<(), ParseError> {
    if name.as_ref() == ROOT.as_bytes() {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot(
            String::from_utf8_lossy(name.as_ref()).into_owned(),
        ))
    }
}

impl From<&[AnimalRecord]> for XmlDocument {
    fn from(records: &[AnimalRecord]) -> Self {
        Self {
            animals: records.iter().cloned().map(XmlAnimal::from).collect(),
        }
    }
}

impl From<AnimalRecord> for XmlAnimal {
    fn from(record: AnimalRecord) -> Self {
        let AnimalRecord {
            species,
            feed_type,
            current_stock,
            unit,
            reorder_needed,
            reorder_date,
        } = record;
        Self {
            species,
            feed_type,
            current_stock,
            unit,
            reorder_needed,
            reorder_date,
        }
    }
}

impl From<XmlAnimal> for AnimalRecord {
    fn from(animal: XmlAnimal) -> Self {
        let XmlAnimal {
            species,
            feed_type,
            current_stock,
            unit,
            reorder_needed,
            reorder_date,
        } = animal;
        Self {
            species,
            feed_type,
            current_stock,
            unit,
            reorder_needed,
            reorder_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn rind() -> AnimalRecord {
        AnimalRecord::sample("Rind", "Mais")
    }

    fn without_date(species: &str) -> AnimalRecord {
        AnimalRecord {
            reorder_date: None,
            ..AnimalRecord::sample(species, "Heu")
        }
    }

    #[test]
    fn seed_record_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("animals.xml");

        save(&[rind()], &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, [rind()]);
    }

    #[test]
    fn round_trip_preserves_order_and_missing_dates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("animals.xml");
        let mut records = AnimalRecord::sample_data();
        records.insert(2, without_date("Esel"));
        records.push(AnimalRecord {
            current_stock: 0.1 + 0.2,
            unit: "Ballen & Säcke <gross>".to_string(),
            ..without_date("Ziege")
        });

        save(&records, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, records);
    }

    #[test]
    fn empty_record_set_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.xml");

        save(&[], &path).unwrap();

        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn document_layout() {
        let xml = XmlDocument::from(&[rind(), without_date("Kalb")][..])
            .to_xml()
            .unwrap();

        assert!(xml.starts_with("<?xml"));
        let lines: Vec<_> = xml.lines().collect();
        assert_eq!(lines[1], "<animals>");
        assert_eq!(lines[2], "    <animal>");
        assert_eq!(lines[3], "        <tierArt>Rind</tierArt>");
        assert!(xml.contains("<aktuellerBestand>50.5</aktuellerBestand>"));
        assert!(xml.contains("<bestelldatum>1999-02-21</bestelldatum>"));
        assert_eq!(xml.matches("<bestelldatum>").count(), 1);

        let order = ["tierArt", "futterArt", "aktuellerBestand", "mengeneinheit"];
        let positions: Vec<_> = order.iter().map(|tag| xml.find(tag).unwrap()).collect();
        assert!(positions.is_sorted());
    }

    #[test]
    fn reads_hand_written_document() {
        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<animals>
    <animal>
        <tierArt>Pferd</tierArt>
        <futterArt>Gras</futterArt>
        <aktuellerBestand>12.0</aktuellerBestand>
        <mengeneinheit>Ballen</mengeneinheit>
        <bestellungnotwendig>Ja</bestellungnotwendig>
        <bestelldatum>2024-03-01</bestelldatum>
    </animal>
</animals>
"#;

        let records = XmlDocument::read(content).unwrap().into_records();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].species, "Pferd");
        assert_eq!(records[0].unit, "Ballen");
        assert!(records[0].needs_reorder());
        assert_eq!(records[0].reorder_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load(&temp_dir.path().join("missing.xml"));

        assert!(matches!(result, Err(LoadError::NotFound)));
    }

    #[test]
    fn non_numeric_stock_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.xml");
        std::fs::write(
            &path,
            "<animals><animal><aktuellerBestand>not-a-number</aktuellerBestand></animal></animals>",
        )
        .unwrap();

        let result = load(&path);

        assert!(matches!(result, Err(LoadError::Parse(ParseError::Content(_)))));
    }

    #[test]
    fn invalid_date_is_a_parse_error() {
        let content = "<animals><animal><aktuellerBestand>1</aktuellerBestand>\
                       <bestelldatum>21.02.1999</bestelldatum></animal></animals>";

        assert!(XmlDocument::read(content).is_err());
    }

    #[test]
    fn mismatched_tags_are_a_parse_error() {
        let content = "<animals><animal><tierArt>Rind</futterArt></animal></animals>";

        assert!(XmlDocument::read(content).is_err());
    }

    #[test]
    fn content_after_the_root_is_rejected() {
        let animal = "<animal><aktuellerBestand>1</aktuellerBestand></animal>";

        let second_root = format!("<animals></animals><animals>{animal}</animals>");
        assert!(matches!(
            XmlDocument::read(&second_root),
            Err(ParseError::TrailingContent)
        ));

        let trailing_text = format!("<animals>{animal}</animals>trailing garbage");
        assert!(matches!(
            XmlDocument::read(&trailing_text),
            Err(ParseError::TrailingContent)
        ));

        let stray_end_tag = format!("<animals>{animal}</animals></bogus>");
        assert!(XmlDocument::read(&stray_end_tag).is_err());
    }

    #[test]
    fn comments_after_the_root_are_accepted() {
        let content = "<animals><animal><aktuellerBestand>1</aktuellerBestand></animal></animals>\n\
                       <!-- written by hand -->\n";

        assert_eq!(XmlDocument::read(content).unwrap().animals.len(), 1);
    }

    #[test]
    fn unknown_elements_between_animals_are_ignored() {
        let content = "<animals>\
                       <animal><tierArt>Rind</tierArt><aktuellerBestand>1</aktuellerBestand></animal>\
                       <note>checked in spring</note>\
                       <animal><tierArt>Kalb</tierArt><aktuellerBestand>2</aktuellerBestand></animal>\
                       </animals>";

        let records = XmlDocument::read(content).unwrap().into_records();

        let species: Vec<_> = records.iter().map(|r| r.species.as_str()).collect();
        assert_eq!(species, ["Rind", "Kalb"]);
    }

    #[test]
    fn empty_date_element_means_no_date() {
        let content = "<animals><animal><aktuellerBestand>1</aktuellerBestand>\
                       <bestelldatum/></animal></animals>";

        let records = XmlDocument::read(content).unwrap().into_records();

        assert_eq!(records[0].reorder_date, None);
    }

    #[test]
    fn wrong_root_is_rejected() {
        let content = "<tiere><animal><aktuellerBestand>1</aktuellerBestand></animal></tiere>";

        assert!(matches!(
            XmlDocument::read(content),
            Err(ParseError::UnexpectedRoot(name)) if name == "tiere"
        ));
    }

    #[test]
    fn missing_root_is_rejected() {
        assert!(matches!(
            XmlDocument::read(""),
            Err(ParseError::MissingRoot)
        ));
        assert!(matches!(
            XmlDocument::read("<?xml version=\"1.0\"?>\njust text"),
            Err(ParseError::MissingRoot)
        ));
    }

    #[test]
    fn missing_text_fields_default_to_empty() {
        let content = "<animals><animal><aktuellerBestand>3</aktuellerBestand></animal></animals>";

        let records = XmlDocument::read(content).unwrap().into_records();

        assert_eq!(records[0].species, "");
        assert_eq!(records[0].reorder_date, None);
    }

    #[test]
    fn save_to_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("animals.xml");

        let result = save(&[rind()], &path);

        assert!(matches!(result, Err(SaveError::Io(_))));
    }
}
