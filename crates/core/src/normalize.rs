//! French typographic spacing for lyrics and metadata.
//!
//! French double punctuation (`; : ! ? »`) takes a non-breaking space before
//! the mark, and an opening guillemet `«` takes one after it. Ordinary
//! spaces in those positions are replaced so the mark never wraps onto its
//! own line on a slide.

use regex::Regex;
use std::sync::LazyLock;

/// Non-breaking space (U+00A0).
pub const NBSP: char = '\u{00A0}';

/// Horizontal whitespace (including existing NBSPs) before a double mark.
/// Line breaks are left alone.
static DOUBLE_PUNCTUATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s&&[^\r\n]]*([;:!?»])").unwrap());

/// Opening guillemet followed by horizontal whitespace.
static OPENING_GUILLEMET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"«[\s&&[^\r\n]]*").unwrap());

/// Apply the French spacing rule to `text`.
///
/// Idempotent: running it on its own output changes nothing.
pub fn fix_french_punctuation(text: &str) -> String {
    fix_french_punctuation_tracking(text, &mut [])
}

/// Apply the French spacing rule and move every character offset in
/// `offsets` so it points at the same character of the result.
///
/// An offset inside a replaced span lands on the corresponding position of
/// its replacement, clamped to the start of that replacement.
pub fn fix_french_punctuation_tracking(text: &str, offsets: &mut [usize]) -> String {
    if text.is_empty() {
        return String::new();
    }

    let spaced = replace_tracking(&DOUBLE_PUNCTUATION_REGEX, text, "\u{00A0}${1}", offsets);
    replace_tracking(&OPENING_GUILLEMET_REGEX, &spaced, "«\u{00A0}", offsets)
}

/// A replaced span, in characters: `start..end` of the input became
/// `new_len` characters of output.
struct Edit {
    start: usize,
    end: usize,
    new_len: usize,
}

fn replace_tracking(regex: &Regex, text: &str, replacement: &str, offsets: &mut [usize]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut edits = Vec::new();
    let mut last_byte = 0;
    let mut last_char = 0;

    for captures in regex.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let kept = &text[last_byte..whole.start()];
        out.push_str(kept);

        let start = last_char + kept.chars().count();
        let end = start + whole.as_str().chars().count();
        let before = out.len();
        captures.expand(replacement, &mut out);
        edits.push(Edit {
            start,
            end,
            new_len: out[before..].chars().count(),
        });

        last_byte = whole.end();
        last_char = end;
    }
    out.push_str(&text[last_byte..]);

    if !edits.is_empty() {
        for offset in offsets.iter_mut() {
            *offset = shift_offset(*offset, &edits);
        }
    }

    out
}

fn shift_offset(offset: usize, edits: &[Edit]) -> usize {
    let mut shifted = offset;
    for edit in edits {
        if offset >= edit.end {
            shifted = shifted + edit.new_len - (edit.end - edit.start);
        } else if offset >= edit.start {
            let new_start = shifted - (offset - edit.start);
            let into = edit.new_len.saturating_sub(edit.end - offset);
            return new_start + into;
        } else {
            break;
        }
    }
    shifted
}

/// Punctuation normalizer that can be switched off by configuration.
#[derive(Debug, Clone)]
pub struct PunctuationNormalizer {
    /// Whether the French spacing rule is applied.
    enabled: bool,
}

impl Default for PunctuationNormalizer {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PunctuationNormalizer {
    /// Create a normalizer with the rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the rule is applied.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Normalize a piece of text. Returns the input unchanged when disabled.
    pub fn normalize(&self, text: &str) -> String {
        if self.enabled {
            fix_french_punctuation(text)
        } else {
            text.to_string()
        }
    }

    /// Normalize text, moving chord `offsets` along with it.
    pub fn normalize_tracking(&self, text: &str, offsets: &mut [usize]) -> String {
        if self.enabled {
            fix_french_punctuation_tracking(text, offsets)
        } else {
            text.to_string()
        }
    }

    /// Normalize a markup line, leaving directive lines (`{...}`) untouched.
    pub fn normalize_markup_line(&self, line: &str) -> String {
        if line.trim_start().starts_with('{') {
            line.to_string()
        } else {
            self.normalize(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_space_replaced() {
        assert_eq!(
            fix_french_punctuation("Bonjour ; comment allez-vous"),
            "Bonjour\u{00A0}; comment allez-vous"
        );
    }

    #[test]
    fn test_colon_exclamation_question() {
        assert_eq!(
            fix_french_punctuation("Titre : Sous-titre"),
            "Titre\u{00A0}: Sous-titre"
        );
        assert_eq!(fix_french_punctuation("Magnifique !"), "Magnifique\u{00A0}!");
        assert_eq!(
            fix_french_punctuation("Comment vas-tu ?"),
            "Comment vas-tu\u{00A0}?"
        );
    }

    #[test]
    fn test_inserts_when_no_space_present() {
        assert_eq!(fix_french_punctuation("Gloire!"), "Gloire\u{00A0}!");
    }

    #[test]
    fn test_multiple_spaces_collapse_to_one_nbsp() {
        assert_eq!(fix_french_punctuation("Alléluia   !"), "Alléluia\u{00A0}!");
    }

    #[test]
    fn test_guillemets() {
        assert_eq!(
            fix_french_punctuation("« Texte »"),
            "«\u{00A0}Texte\u{00A0}»"
        );
        assert_eq!(fix_french_punctuation("«Texte»"), "«\u{00A0}Texte\u{00A0}»");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Bonjour ; comment allez-vous",
            "« Il a dit : viens ! »",
            "«»",
            "Pourquoi ?!",
            "Sans ponctuation",
            "Ligne un :\nLigne deux !",
            "",
        ];
        for sample in samples {
            let once = fix_french_punctuation(sample);
            assert_eq!(fix_french_punctuation(&once), once, "input: {:?}", sample);
        }
    }

    #[test]
    fn test_line_breaks_preserved() {
        assert_eq!(
            fix_french_punctuation("Ligne un\n!"),
            "Ligne un\n\u{00A0}!"
        );
    }

    #[test]
    fn test_other_characters_untouched() {
        let text = "Jésus, mon ami. C'est (vrai) - 2024";
        assert_eq!(fix_french_punctuation(text), text);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fix_french_punctuation(""), "");
    }

    #[test]
    fn test_disabled_normalizer_passes_through() {
        let normalizer = PunctuationNormalizer::new().with_enabled(false);
        assert_eq!(normalizer.normalize("Bonjour ; toi"), "Bonjour ; toi");
    }

    fn tracked(text: &str, offsets: &[usize]) -> (String, Vec<usize>) {
        let mut offsets = offsets.to_vec();
        let text = fix_french_punctuation_tracking(text, &mut offsets);
        (text, offsets)
    }

    fn tail(text: &str, offset: usize) -> String {
        text.chars().skip(offset).collect()
    }

    #[test]
    fn test_tracking_inserted_nbsp_shifts_later_offsets() {
        let (text, offsets) = tracked("Viens! Amen", &[0, 7]);
        assert_eq!(text, "Viens\u{00A0}! Amen");
        assert_eq!(offsets, vec![0, 8]);
        assert_eq!(tail(&text, offsets[1]), "Amen");
    }

    #[test]
    fn test_tracking_collapsed_spaces_shift_back() {
        let (text, offsets) = tracked("Gloire   ! x", &[11]);
        assert_eq!(text, "Gloire\u{00A0}! x");
        assert_eq!(tail(&text, offsets[0]), "x");
    }

    #[test]
    fn test_tracking_guillemet() {
        let (text, offsets) = tracked("«  Dieu »", &[3]);
        assert_eq!(text, "«\u{00A0}Dieu\u{00A0}»");
        assert_eq!(tail(&text, offsets[0]), "Dieu\u{00A0}»");
    }

    #[test]
    fn test_tracking_offset_on_mark_stays_on_mark() {
        let (text, offsets) = tracked("Viens  !", &[7, 6]);
        assert_eq!(text, "Viens\u{00A0}!");
        assert_eq!(tail(&text, offsets[0]), "!");
        assert_eq!(tail(&text, offsets[1]), "\u{00A0}!");
    }

    #[test]
    fn test_tracking_matches_plain_rule() {
        for sample in ["« Il a dit : viens ! »", "Pourquoi ?!", "Sans ponctuation"] {
            let (text, _) = tracked(sample, &[]);
            assert_eq!(text, fix_french_punctuation(sample));
        }
    }

    #[test]
    fn test_markup_line_skips_directives() {
        let normalizer = PunctuationNormalizer::new();
        assert_eq!(normalizer.normalize_markup_line("{c: Refrain}"), "{c: Refrain}");
        assert_eq!(
            normalizer.normalize_markup_line("[C]Viens !"),
            "[C]Viens\u{00A0}!"
        );
    }
}
