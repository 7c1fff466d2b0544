//! Inline chord extraction.
//!
//! A lyric line such as `[C]Hello [G]world` becomes the chord-free text
//! `Hello world` plus chord marks positioned by character offset in that text.

use regex::Regex;
use std::sync::LazyLock;

use crate::hash;
use crate::types::{ChordMark, ParsedLine};

/// A chord in bracket notation: `[Am7]`.
static CHORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

/// Leading numbered-list marker: `1. `.
static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());

/// Length of the chord id prefix.
const CHORD_ID_LEN: usize = 5;

/// Stable identifier for a chord at a given offset of the source line.
pub fn chord_id(symbol: &str, source_offset: usize) -> String {
    hash::short_id(&format!("{}{}", symbol, source_offset), CHORD_ID_LEN)
}

/// Remove every bracketed chord from `line`.
pub fn strip_chords(line: &str) -> String {
    CHORD_REGEX.replace_all(line, "").into_owned()
}

/// Split a raw content line into chord-free text and chord marks.
///
/// Offsets are counted in characters. Each chord's offset is its position in
/// the source line minus the bracket notation (`[` + symbol + `]`) of every
/// chord before it, i.e. its position in the chord-stripped text. A leading
/// `N. ` list marker is removed from the text afterwards and offsets move
/// back with it; a chord sitting on the marker lands at offset 0.
pub fn parse_chord_line(line: &str) -> ParsedLine {
    let mut chords = Vec::new();
    let mut removed = 0usize;
    let mut scanned_bytes = 0usize;
    let mut scanned_chars = 0usize;

    for captures in CHORD_REGEX.captures_iter(line) {
        let (Some(whole), Some(symbol)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        scanned_chars += line[scanned_bytes..whole.start()].chars().count();
        scanned_bytes = whole.start();
        let source_offset = scanned_chars;

        let symbol = symbol.as_str();
        chords.push(ChordMark {
            id: chord_id(symbol, source_offset),
            offset: source_offset.saturating_sub(removed),
            symbol: symbol.to_string(),
        });

        removed += symbol.chars().count() + 2;
    }

    let stripped = strip_chords(line);
    let text = match LIST_MARKER_REGEX.find(&stripped) {
        Some(marker) => {
            let marker_len = marker.as_str().chars().count();
            for chord in &mut chords {
                chord.offset = chord.offset.saturating_sub(marker_len);
            }
            stripped[marker.end()..].to_string()
        }
        None => stripped,
    };

    ParsedLine { text, chords }
}
