//! ChordPro-style markup parser.
//!
//! A single pass over the document's lines driven by [`ParseState`]. The
//! parser is permissive: malformed directives are plain content and nothing
//! here returns an error.

use regex::Regex;
use std::sync::LazyLock;

use crate::section_type::SectionTypeResolver;
use crate::types::{comment_label, DirectiveMap, ParsedSong, Section, SectionHeading};

/// Generic directive: `{key}` or `{key: value}`.
static DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{([^:}]+)(?::(.*))?\}$").unwrap());

const START_OF_BLOCK: &str = "{start_of_";
const END_OF_BLOCK: &str = "{end_of_";

/// What a single source line means to the parser.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    CommentLabel(&'a str),
    StartOfBlock {
        keyword: &'a str,
        label: Option<&'a str>,
    },
    EndOfBlock,
    Directive {
        key: &'a str,
        value: &'a str,
    },
    Text,
}

fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();

    if let Some(label) = comment_label(trimmed) {
        return LineKind::CommentLabel(label);
    }

    if let Some(rest) = trimmed.strip_prefix(START_OF_BLOCK) {
        let inner = rest.strip_suffix('}').unwrap_or(rest);
        let (keyword, label) = match inner.split_once(':') {
            Some((keyword, label)) => {
                let label = label.trim();
                (keyword, (!label.is_empty()).then_some(label))
            }
            None => (inner, None),
        };
        return LineKind::StartOfBlock {
            keyword: keyword.trim(),
            label,
        };
    }

    if trimmed.starts_with(END_OF_BLOCK) {
        return LineKind::EndOfBlock;
    }

    if let Some(captures) = DIRECTIVE_REGEX.captures(trimmed) {
        let key = captures.get(1).map_or("", |m| m.as_str().trim());
        if !key.is_empty() {
            let value = captures.get(2).map_or("", |m| m.as_str().trim());
            return LineKind::Directive { key, value };
        }
    }

    LineKind::Text
}

/// A block that has been opened but not yet closed.
#[derive(Debug)]
struct OpenSection {
    heading: SectionHeading,
    label: Option<String>,
    content: Vec<String>,
}

impl OpenSection {
    fn close(self) -> Section {
        Section::new(self.heading, self.label, self.content)
    }
}

/// Parser state between lines.
#[derive(Debug)]
enum ParseState {
    /// Outside any block, no label waiting.
    Outside,
    /// Outside any block, with a label waiting for the next block.
    LabelPending(String),
    /// Inside a block. A label seen inside is kept for the next block.
    InSection {
        open: OpenSection,
        pending_label: Option<String>,
    },
}

/// Parser for song markup documents.
#[derive(Debug, Clone, Copy)]
pub struct MarkupParser<'a> {
    resolver: SectionTypeResolver<'a>,
}

impl<'a> MarkupParser<'a> {
    /// Create a parser that resolves section types with `resolver`.
    pub fn new(resolver: SectionTypeResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Parse a whole document into its directives and closed sections.
    ///
    /// A block still open at the end of the document is dropped: only an
    /// explicit `end_of_` emits a section.
    pub fn parse(&self, text: &str) -> ParsedSong {
        let mut song = ParsedSong::default();
        let mut state = ParseState::Outside;

        for line in text.lines() {
            state = self.advance(state, line, &mut song);
        }

        if let ParseState::InSection { open, .. } = state {
            log::warn!(
                "Dropping unterminated section '{}' ({} lines)",
                open.heading.name,
                open.content.len()
            );
        }

        log::debug!(
            "Parsed {} directives and {} sections",
            song.directives.len(),
            song.sections.len()
        );

        song
    }

    fn advance(&self, state: ParseState, line: &str, song: &mut ParsedSong) -> ParseState {
        match (state, classify(line)) {
            (ParseState::Outside | ParseState::LabelPending(_), LineKind::CommentLabel(label)) => {
                ParseState::LabelPending(label.to_string())
            }
            (ParseState::InSection { mut open, .. }, LineKind::CommentLabel(label)) => {
                open.content.push(line.to_string());
                ParseState::InSection {
                    open,
                    pending_label: Some(label.to_string()),
                }
            }

            (state, LineKind::StartOfBlock { keyword, label }) => {
                let pending = match state {
                    ParseState::Outside => None,
                    ParseState::LabelPending(pending) => Some(pending),
                    ParseState::InSection {
                        open,
                        pending_label,
                    } => {
                        song.sections.push(open.close());
                        pending_label
                    }
                };
                let label = label.map(str::to_string).or(pending);
                let heading = self.resolver.resolve(keyword, label.as_deref());
                ParseState::InSection {
                    open: OpenSection {
                        heading,
                        label,
                        content: Vec::new(),
                    },
                    pending_label: None,
                }
            }

            (
                ParseState::InSection {
                    open,
                    pending_label,
                },
                LineKind::EndOfBlock,
            ) => {
                song.sections.push(open.close());
                match pending_label {
                    Some(label) => ParseState::LabelPending(label),
                    None => ParseState::Outside,
                }
            }
            (state @ (ParseState::Outside | ParseState::LabelPending(_)), LineKind::EndOfBlock) => {
                state
            }

            (mut state, LineKind::Directive { key, value }) => {
                song.directives.insert(key, value);
                if let ParseState::InSection { open, .. } = &mut state {
                    open.content.push(line.to_string());
                }
                state
            }

            (
                ParseState::InSection {
                    mut open,
                    pending_label,
                },
                LineKind::Text,
            ) => {
                open.content.push(line.to_string());
                ParseState::InSection {
                    open,
                    pending_label,
                }
            }
            (state @ (ParseState::Outside | ParseState::LabelPending(_)), LineKind::Text) => state,
        }
    }
}
