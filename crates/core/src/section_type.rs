//! Mapping of block keywords and free-text labels to section types.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::types::{SectionHeading, SectionType};

/// Label ending in a number: "refrain 2", "strophe10".
static NUMBERED_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\p{L}\s'’-]*\p{L})\s*(\d+)$").unwrap());

/// Label ending in a single, separated letter: "couplet b".
static LETTERED_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\p{L}\s'’-]*\p{L})\s+(\p{L})$").unwrap());

/// One entry of the label table: labels containing `pattern` map to `section_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub pattern: String,
    pub section_type: SectionType,
}

impl LabelRule {
    pub fn new(pattern: impl Into<String>, section_type: SectionType) -> Self {
        Self {
            pattern: pattern.into(),
            section_type,
        }
    }
}

/// The default French/English label table. Order matters: first match wins.
pub fn default_label_rules() -> Vec<LabelRule> {
    vec![
        LabelRule::new("refrain", SectionType::Chorus),
        LabelRule::new("chorus", SectionType::Chorus),
        LabelRule::new("strophe", SectionType::Verse),
        LabelRule::new("verse", SectionType::Verse),
        LabelRule::new("pont", SectionType::Bridge),
        LabelRule::new("bridge", SectionType::Bridge),
        LabelRule::new("introduction", SectionType::Intro),
        LabelRule::new("intro", SectionType::Intro),
        LabelRule::new("fin", SectionType::Outro),
        LabelRule::new("outro", SectionType::Outro),
    ]
}

/// Title-case a keyword the way headings are displayed: the first letter of
/// every alphabetic run is upper-cased, the rest lower-cased.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Split a lowercased label into its lookup phrase and trailing ordinal.
fn split_ordinal(label: &str) -> Option<(&str, &str)> {
    let captures = NUMBERED_LABEL_REGEX
        .captures(label)
        .or_else(|| LETTERED_LABEL_REGEX.captures(label))?;
    let phrase = captures.get(1)?.as_str();
    let ordinal = captures.get(2)?.as_str();
    Some((phrase.trim(), ordinal))
}

/// Resolves `(keyword, label)` pairs against a label table.
#[derive(Debug, Clone, Copy)]
pub struct SectionTypeResolver<'a> {
    rules: &'a [LabelRule],
}

impl<'a> SectionTypeResolver<'a> {
    pub fn new(rules: &'a [LabelRule]) -> Self {
        Self { rules }
    }

    /// Resolve the heading of a block.
    ///
    /// Without a label the heading is the title-cased keyword and the type is
    /// taken from the keyword. With a label, a trailing ordinal is split off
    /// and the remaining phrase is matched by substring against the table; if
    /// nothing matches, the keyword decides the type.
    pub fn resolve(&self, keyword: &str, label: Option<&str>) -> SectionHeading {
        let keyword = keyword.trim();
        let keyword_type = SectionType::from_keyword(keyword);

        let Some(label) = label else {
            return SectionHeading {
                name: title_case(keyword),
                section_type: keyword_type,
                ordinal: None,
            };
        };

        let folded = fold(label.trim());
        let (lookup, ordinal) = match split_ordinal(&folded) {
            Some((phrase, ordinal)) => (phrase, Some(ordinal.to_string())),
            None => (folded.as_str(), None),
        };

        let section_type = self
            .rules
            .iter()
            .find(|rule| lookup.contains(fold(&rule.pattern).as_str()))
            .map(|rule| rule.section_type.clone())
            .unwrap_or(keyword_type);

        SectionHeading {
            name: label.to_string(),
            section_type,
            ordinal,
        }
    }
}
