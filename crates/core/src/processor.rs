//! End-to-end conversion of one markup document.

use crate::config::ProcessorConfig;
use crate::deck::{validate_show_value, Show, ShowMeta, SlideDeckBuilder};
use crate::dedup::{deduplicate_sections, Deduplicated};
use crate::enhance::render_enhanced;
use crate::metadata::SongMetadata;
use crate::normalize::PunctuationNormalizer;
use crate::parser::MarkupParser;
use crate::section_type::SectionTypeResolver;
use crate::types::ParsedSong;

/// Everything produced for one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document_id: String,
    pub song: ParsedSong,
    pub show: Show,
    /// Enhanced markup text for persistence.
    pub enhanced: String,
    /// Schema problems found on the assembled show. Never fatal.
    pub warnings: Vec<String>,
}

impl Conversion {
    /// Number of sections as declared in the document.
    pub fn section_count(&self) -> usize {
        self.song.sections.len()
    }

    /// Number of distinct slides after deduplication.
    pub fn slide_count(&self) -> usize {
        self.show.body().slides.len()
    }
}

/// Runs parse, deduplication, deck assembly and enhanced rendering.
#[derive(Debug, Clone, Default)]
pub struct SongProcessor {
    config: ProcessorConfig,
}

impl SongProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    fn normalizer(&self) -> PunctuationNormalizer {
        PunctuationNormalizer::new().with_enabled(self.config.fix_french_punctuation)
    }

    /// Parse a document with this processor's label table.
    pub fn parse(&self, text: &str) -> ParsedSong {
        MarkupParser::new(SectionTypeResolver::new(&self.config.label_rules)).parse(text)
    }

    /// Deduplicate sections, or keep them all when disabled.
    pub fn deduplicate(&self, song: &ParsedSong) -> Deduplicated {
        if self.config.deduplicate_sections {
            deduplicate_sections(&song.sections)
        } else {
            Deduplicated::identity(&song.sections)
        }
    }

    /// Convert a document, stamping the show with the current time.
    pub fn convert(
        &self,
        document_id: &str,
        text: &str,
        record: Option<&SongMetadata>,
    ) -> Conversion {
        self.convert_with(SlideDeckBuilder::new(&self.config), document_id, text, record)
    }

    /// Convert a document with a fixed timestamp (milliseconds since epoch).
    pub fn convert_at(
        &self,
        document_id: &str,
        text: &str,
        record: Option<&SongMetadata>,
        timestamp: i64,
    ) -> Conversion {
        let builder = SlideDeckBuilder::new(&self.config).with_timestamp(timestamp);
        self.convert_with(builder, document_id, text, record)
    }

    fn convert_with(
        &self,
        builder: SlideDeckBuilder<'_>,
        document_id: &str,
        text: &str,
        record: Option<&SongMetadata>,
    ) -> Conversion {
        if record.is_none() {
            log::debug!("No metadata record for '{}'", document_id);
        }

        let song = self.parse(text);
        let sections = self.deduplicate(&song);
        let show = builder.build(document_id, &song.directives, &sections, record);

        let normalizer = self.normalizer();
        let meta = ShowMeta::resolve(document_id, &song.directives, record, &normalizer);
        let enhanced = render_enhanced(&song, &meta, &normalizer);

        let warnings = validate(&show);
        for warning in &warnings {
            log::warn!("Show validation warning for '{}': {}", document_id, warning);
        }

        Conversion {
            document_id: document_id.to_string(),
            song,
            show,
            enhanced,
            warnings,
        }
    }
}

fn validate(show: &Show) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Err(e) = show.check_layout() {
        warnings.push(e.to_string());
    }

    match show.to_json_value() {
        Ok(value) => {
            if let Err(e) = validate_show_value(&value) {
                warnings.push(e.to_string());
            }
        }
        Err(e) => warnings.push(e.to_string()),
    }

    warnings
}
