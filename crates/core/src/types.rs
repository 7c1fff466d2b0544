//! Domain types for parsed songs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash;

/// Prefixes that mark a comment/label line.
const COMMENT_PREFIXES: &[&str] = &["{c:", "{comment:"];

/// Extract the label text from a comment line such as `{c: Refrain}`.
///
/// Leading and trailing whitespace around the line is ignored. Returns `None`
/// for any other line.
pub fn comment_label(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    COMMENT_PREFIXES.iter().find_map(|prefix| {
        let rest = trimmed.strip_prefix(prefix)?;
        let inner = rest.strip_suffix('}').unwrap_or(rest);
        Some(inner.trim())
    })
}

/// Whether a line is a comment/label line.
pub fn is_comment_label(line: &str) -> bool {
    comment_label(line).is_some()
}

/// The kind of block a section represents.
///
/// Unmapped block keywords are carried verbatim in [`SectionType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionType {
    Verse,
    Chorus,
    Bridge,
    PreChorus,
    Tag,
    Intro,
    Outro,
    Other(String),
}

impl SectionType {
    /// All canonical types, in vocabulary order.
    pub const CANONICAL: [SectionType; 7] = [
        SectionType::Verse,
        SectionType::Chorus,
        SectionType::Bridge,
        SectionType::PreChorus,
        SectionType::Tag,
        SectionType::Intro,
        SectionType::Outro,
    ];

    /// Map a block keyword (the `X` in `start_of_X`) to a section type.
    ///
    /// Matching is case-insensitive; anything outside the vocabulary is kept
    /// as-is (trimmed) in `Other`.
    pub fn from_keyword(keyword: &str) -> Self {
        let keyword = keyword.trim();
        match keyword.to_lowercase().as_str() {
            "verse" => Self::Verse,
            "chorus" => Self::Chorus,
            "bridge" => Self::Bridge,
            "pre_chorus" | "pre-chorus" | "prechorus" => Self::PreChorus,
            "tag" => Self::Tag,
            "intro" => Self::Intro,
            "outro" => Self::Outro,
            _ => Self::Other(keyword.to_string()),
        }
    }

    /// The keyword used in markup and in the color/group tables.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verse => "verse",
            Self::Chorus => "chorus",
            Self::Bridge => "bridge",
            Self::PreChorus => "pre_chorus",
            Self::Tag => "tag",
            Self::Intro => "intro",
            Self::Outro => "outro",
            Self::Other(keyword) => keyword,
        }
    }

    /// Whether this type belongs to the fixed vocabulary.
    pub fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SectionType {
    fn from(value: String) -> Self {
        Self::from_keyword(&value)
    }
}

impl From<SectionType> for String {
    fn from(value: SectionType) -> Self {
        value.as_str().to_string()
    }
}

/// Document-level directives in declaration order.
///
/// Re-declaring a key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectiveMap {
    entries: Vec<(String, String)>,
}

impl DirectiveMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directive, overwriting any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a directive value. Keys are case-sensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DirectiveMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Resolved heading of a block: display name, type and optional ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeading {
    /// Display name: the label when one was given, else the title-cased keyword.
    pub name: String,
    pub section_type: SectionType,
    /// Trailing number or letter split off the label ("2" in "Refrain 2").
    pub ordinal: Option<String>,
}

/// A `start_of_X` .. `end_of_X` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// The label text the block was introduced with, if any.
    pub label: Option<String>,
    pub name: String,
    pub section_type: SectionType,
    pub ordinal: Option<String>,
    /// Content lines exactly as they appeared in the source.
    pub content: Vec<String>,
    /// `content` joined by `\n`.
    pub raw_text: String,
}

impl Section {
    /// Build a section from its heading and content lines.
    pub fn new(heading: SectionHeading, label: Option<String>, content: Vec<String>) -> Self {
        let raw_text = content.join("\n");
        Self {
            label,
            name: heading.name,
            section_type: heading.section_type,
            ordinal: heading.ordinal,
            content,
            raw_text,
        }
    }

    /// Digest of the content with comment/label lines left out.
    pub fn content_hash(&self) -> String {
        hash::content_hash(&self.content)
    }

    /// Content lines that end up on a slide: no comment labels, no blanks.
    pub fn display_lines(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .map(String::as_str)
            .filter(|line| !is_comment_label(line) && !line.trim().is_empty())
    }
}

/// A chord positioned inside chord-free lyric text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordMark {
    /// Short digest of the symbol and its offset in the source line.
    pub id: String,
    /// Character offset in the chord-stripped text.
    #[serde(rename = "pos")]
    pub offset: usize,
    /// The chord symbol, e.g. `Am7`.
    #[serde(rename = "key")]
    pub symbol: String,
}

/// A lyric line with its chords lifted out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLine {
    pub text: String,
    pub chords: Vec<ChordMark>,
}

/// Output of parsing one markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSong {
    pub directives: DirectiveMap,
    pub sections: Vec<Section>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_label_forms() {
        assert_eq!(comment_label("{c: Refrain}"), Some("Refrain"));
        assert_eq!(comment_label("  {comment:Strophe 1}  "), Some("Strophe 1"));
        assert_eq!(comment_label("{c: unterminated"), Some("unterminated"));
        assert_eq!(comment_label("{title: Song}"), None);
        assert_eq!(comment_label("Plain text"), None);
    }

    #[test]
    fn test_section_type_from_keyword() {
        assert_eq!(SectionType::from_keyword("verse"), SectionType::Verse);
        assert_eq!(SectionType::from_keyword("Chorus"), SectionType::Chorus);
        assert_eq!(SectionType::from_keyword("pre-chorus"), SectionType::PreChorus);
        assert_eq!(
            SectionType::from_keyword("grid"),
            SectionType::Other("grid".to_string())
        );
        assert_eq!(SectionType::PreChorus.as_str(), "pre_chorus");
        assert!(!SectionType::from_keyword("tab").is_canonical());
    }

    #[test]
    fn test_directive_map_last_write_wins_in_place() {
        let mut map = DirectiveMap::new();
        map.insert("title", "First");
        map.insert("key", "C");
        map.insert("title", "Second");

        assert_eq!(map.get("title"), Some("Second"));
        assert_eq!(map.len(), 2);
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["title", "key"]);
    }

    #[test]
    fn test_directive_map_is_case_sensitive() {
        let map: DirectiveMap = [("Title", "A")].into_iter().collect();
        assert_eq!(map.get("title"), None);
        assert_eq!(map.get("Title"), Some("A"));
    }

    #[test]
    fn test_directive_map_first_of_skips_empty() {
        let map: DirectiveMap = [("lyricist", ""), ("artist", "Someone")]
            .into_iter()
            .collect();
        assert_eq!(map.first_of(&["lyricist", "artist"]), Some("Someone"));
        assert_eq!(map.first_of(&["composer"]), None);
    }

    #[test]
    fn test_section_raw_text_and_display_lines() {
        let heading = SectionHeading {
            name: "Verse".to_string(),
            section_type: SectionType::Verse,
            ordinal: None,
        };
        let content = vec![
            "{c: Strophe}".to_string(),
            "[C]Line one".to_string(),
            "   ".to_string(),
            "Line two".to_string(),
        ];
        let section = Section::new(heading, None, content);

        assert_eq!(section.raw_text, "{c: Strophe}\n[C]Line one\n   \nLine two");
        let lines: Vec<&str> = section.display_lines().collect();
        assert_eq!(lines, vec!["[C]Line one", "Line two"]);
    }
}
