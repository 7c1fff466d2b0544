//! Core parsing, section typing, deduplication and slide-deck assembly
//! for chord-annotated song markup.

pub mod chords;
pub mod config;
pub mod dedup;
pub mod deck;
pub mod enhance;
pub mod error;
pub mod hash;
pub mod metadata;
pub mod normalize;
pub mod parser;
pub mod processor;
pub mod section_type;
pub mod types;

pub use config::{CategoryRule, ProcessorConfig};
pub use deck::{validate_show_value, Show, ShowMeta, SlideDeckBuilder};
pub use dedup::{deduplicate_sections, Deduplicated};
pub use enhance::render_enhanced;
pub use error::{Error, Result};
pub use metadata::{MetadataTable, SongMetadata};
pub use normalize::{fix_french_punctuation, fix_french_punctuation_tracking, PunctuationNormalizer};
pub use parser::MarkupParser;
pub use processor::{Conversion, SongProcessor};
pub use section_type::{default_label_rules, LabelRule, SectionTypeResolver};
pub use types::{ParsedSong, Section, SectionType};
