//! Song metadata table.
//!
//! A `;`-separated table with a header row, one row per song, keyed by the
//! song's file id (`Fichier`). Lookups are case-insensitive.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// First four-digit run in a copyright notice.
static YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

const FIELD_SEPARATOR: char = ';';
const BYTE_ORDER_MARK: char = '\u{FEFF}';
const KEY_COLUMN: &str = "Fichier";

/// Extract the year from copyright text ("© 1995-2023 X" gives "1995").
pub fn extract_year(copyright: &str) -> Option<String> {
    YEAR_REGEX.find(copyright).map(|m| m.as_str().to_string())
}

/// One row of the metadata table. All fields are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// The song id as written in the key column.
    pub number: String,
    pub title: String,
    pub alternate_title: String,
    pub original_title: String,
    pub composer: String,
    pub author: String,
    pub key: String,
    pub format: String,
    pub copyright: String,
    pub reference: String,
    pub theme: String,
    pub tune_of: String,
    pub volume: String,
    pub supplement: String,
    pub extra_flag: String,
    pub link: String,
}

impl SongMetadata {
    /// Year found in the copyright field, if any.
    pub fn year(&self) -> Option<String> {
        extract_year(&self.copyright)
    }
}

/// Split table text into records of fields on `separator`.
///
/// Double-quoted fields may contain the separator, `""` escapes and line
/// breaks; only an unquoted newline ends a record. `\r\n` counts as `\n`.
/// Records whose fields are all blank are dropped.
fn split_records(text: &str, separator: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut fields));
            }
            c if c == separator && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push(fields);
    }

    records.retain(|record| record.iter().any(|field| !field.trim().is_empty()));
    records
}

/// Column positions resolved from the header row.
struct Columns {
    by_name: HashMap<String, usize>,
}

impl Columns {
    fn new(header: &[String]) -> Self {
        let by_name = header
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_lowercase(), index))
            .collect();
        Self { by_name }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    fn get(&self, row: &[String], name: &str) -> String {
        self.index(name)
            .and_then(|index| row.get(index))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }
}

/// Metadata records indexed by lowercased song id.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    records: HashMap<String, SongMetadata>,
}

impl MetadataTable {
    /// An empty table; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse table text. A leading byte-order mark is ignored, blank records
    /// and rows with an empty id are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let mut rows = split_records(text, FIELD_SEPARATOR).into_iter();

        let Some(header) = rows.next() else {
            return Ok(Self::new());
        };
        let columns = Columns::new(&header);
        if columns.index(KEY_COLUMN).is_none() {
            return Err(Error::Metadata(format!(
                "missing '{}' column in header",
                KEY_COLUMN
            )));
        }

        let mut records = HashMap::new();
        for row in rows {
            let number = columns.get(&row, KEY_COLUMN);
            if number.is_empty() {
                continue;
            }

            let record = SongMetadata {
                title: columns.get(&row, "Titre"),
                alternate_title: columns.get(&row, "2e titre"),
                original_title: columns.get(&row, "Titre original"),
                composer: columns.get(&row, "Compositeur"),
                author: columns.get(&row, "Auteur"),
                key: columns.get(&row, "Tonalité"),
                format: columns.get(&row, "Format"),
                copyright: columns.get(&row, "Copyright"),
                reference: columns.get(&row, "Référence"),
                theme: columns.get(&row, "Thème"),
                tune_of: columns.get(&row, "Air du"),
                volume: columns.get(&row, "Vol."),
                supplement: columns.get(&row, "Suppl"),
                extra_flag: columns.get(&row, "F1"),
                link: columns.get(&row, "Lien"),
                number,
            };
            records.insert(record.number.to_lowercase(), record);
        }

        log::info!("Loaded metadata for {} songs", records.len());

        Ok(Self { records })
    }

    /// Read and parse a table file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Look up a song by id, ignoring case.
    pub fn get(&self, id: &str) -> Option<&SongMetadata> {
        self.records.get(&id.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
