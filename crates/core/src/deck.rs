//! FreeShow slide deck assembly.
//!
//! A deck (`.show` file) is a two-element JSON array `[id, body]`. The body
//! holds one slide per unique section and a layout listing slide ids in the
//! song's original order, so a deduplicated chorus appears once in `slides`
//! but as many times in the layout as it is sung.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::chords::parse_chord_line;
use crate::config::ProcessorConfig;
use crate::dedup::Deduplicated;
use crate::error::{Error, Result};
use crate::hash;
use crate::metadata::{extract_year, SongMetadata};
use crate::normalize::PunctuationNormalizer;
use crate::types::{ChordMark, DirectiveMap, Section, SectionType};

/// Length of show, layout and slide ids.
pub const ID_LEN: usize = 11;

/// Top-level fields every show body must carry.
const REQUIRED_FIELDS: &[&str] = &["name", "category", "settings", "slides", "layouts", "timestamps"];

/// Id of the slide built from the `index`-th unique section.
pub fn slide_id(section: &Section, index: usize) -> String {
    hash::short_id(
        &format!("{}{}{}", section.section_type.as_str(), index, section.raw_text),
        ID_LEN,
    )
}

/// A complete show: `[id, body]`.
#[derive(Debug, Clone, Serialize)]
pub struct Show(pub String, pub ShowBody);

impl Show {
    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn body(&self) -> &ShowBody {
        &self.1
    }

    /// The layout referenced by `settings.activeLayout`.
    pub fn active_layout(&self) -> Option<&Layout> {
        self.1.layouts.get(&self.1.settings.active_layout)
    }

    /// Slides in presentation order, following the active layout.
    ///
    /// References that name no slide are skipped; [`Show::check_layout`]
    /// reports them.
    pub fn ordered_slides(&self) -> Vec<&Slide> {
        self.active_layout()
            .map(|layout| {
                layout
                    .slides
                    .iter()
                    .filter_map(|slide_ref| self.1.slides.get(&slide_ref.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Confirm the active layout exists and every reference names a slide.
    pub fn check_layout(&self) -> Result<()> {
        let layout = self.active_layout().ok_or_else(|| {
            Error::Validation(format!(
                "active layout '{}' is not defined",
                self.1.settings.active_layout
            ))
        })?;

        let missing: Vec<&str> = layout
            .slides
            .iter()
            .map(|slide_ref| slide_ref.id.as_str())
            .filter(|id| !self.1.slides.contains_key(*id))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "layout references unknown slides: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Check the serialized shape of a show.
///
/// Expects `[string id, object body]` with every required top-level field.
pub fn validate_show_value(value: &Value) -> Result<()> {
    let parts = value
        .as_array()
        .filter(|parts| parts.len() == 2)
        .ok_or_else(|| {
            Error::Validation("show must be a list with 2 elements [id, show]".to_string())
        })?;

    if !parts[0].is_string() {
        return Err(Error::Validation("show id must be a string".to_string()));
    }

    let body = parts[1]
        .as_object()
        .ok_or_else(|| Error::Validation("show body must be an object".to_string()))?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !body.contains_key(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowBody {
    pub name: String,
    pub origin: String,
    pub private: bool,
    pub category: String,
    pub settings: ShowSettings,
    pub timestamps: Timestamps,
    pub quick_access: QuickAccess,
    pub meta: ShowMeta,
    pub slides: BTreeMap<String, Slide>,
    pub layouts: BTreeMap<String, Layout>,
    pub media: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSettings {
    pub active_layout: String,
    pub template: String,
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    pub created: i64,
    pub modified: i64,
    pub used: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickAccess {
    pub number: String,
}

/// Song-level metadata shown with the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShowMeta {
    pub number: String,
    pub title: String,
    pub artist: String,
    pub author: String,
    pub composer: String,
    pub copyright: String,
    pub year: String,
    pub key: String,
}

fn pick(record_value: Option<&str>, directives: &DirectiveMap, keys: &[&str]) -> String {
    record_value
        .filter(|value| !value.is_empty())
        .or_else(|| directives.first_of(keys))
        .unwrap_or_default()
        .to_string()
}

impl ShowMeta {
    /// Merge a metadata-table record (preferred) with the document's own
    /// directives. Free-text fields go through `normalizer`; the year comes
    /// from the copyright text, else from a `year` directive.
    pub fn resolve(
        document_id: &str,
        directives: &DirectiveMap,
        record: Option<&SongMetadata>,
        normalizer: &PunctuationNormalizer,
    ) -> Self {
        let title = pick(record.map(|r| r.title.as_str()), directives, &["title"]);
        let title = if title.is_empty() {
            document_id.to_string()
        } else {
            title
        };
        let author = pick(
            record.map(|r| r.author.as_str()),
            directives,
            &["lyricist", "artist"],
        );
        let composer = pick(record.map(|r| r.composer.as_str()), directives, &["composer"]);
        let copyright = pick(record.map(|r| r.copyright.as_str()), directives, &["copyright"]);
        let year = extract_year(&copyright)
            .or_else(|| directives.first_of(&["year"]).map(str::to_string))
            .unwrap_or_default();
        let key = directives
            .first_of(&["key"])
            .or(record.map(|r| r.key.as_str()))
            .unwrap_or_default()
            .to_string();
        let number = pick(record.map(|r| r.number.as_str()), directives, &["number"]);

        let author = normalizer.normalize(&author);
        Self {
            number,
            title: normalizer.normalize(&title),
            artist: author.clone(),
            author,
            composer: normalizer.normalize(&composer),
            copyright: normalizer.normalize(&copyright),
            year,
            key,
        }
    }
}

/// One slide per unique section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Display name of the group (the section name).
    pub group: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_group: Option<String>,
    pub settings: BTreeMap<String, Value>,
    pub notes: String,
    pub items: Vec<SlideItem>,
    #[serde(skip)]
    pub section_type: SectionType,
}

impl Slide {
    /// Lines of the slide's text item.
    pub fn lines(&self) -> &[SlideLine] {
        self.items
            .first()
            .map(|item| item.lines.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub lines: Vec<SlideLine>,
    pub style: String,
    pub align: String,
    pub auto: bool,
    pub chords: ChordSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChordSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideLine {
    pub align: String,
    pub text: Vec<TextRun>,
    pub chords: Vec<ChordMark>,
}

impl SlideLine {
    /// The line's text with styling dropped.
    pub fn plain_text(&self) -> String {
        self.text.iter().map(|run| run.value.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub value: String,
    pub style: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub name: String,
    pub notes: String,
    pub slides: Vec<LayoutSlide>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSlide {
    pub id: String,
}

/// Builds a [`Show`] from deduplicated sections.
#[derive(Debug, Clone)]
pub struct SlideDeckBuilder<'a> {
    config: &'a ProcessorConfig,
    normalizer: PunctuationNormalizer,
    /// Fixed creation time; the current time when unset.
    timestamp: Option<i64>,
}

impl<'a> SlideDeckBuilder<'a> {
    pub fn new(config: &'a ProcessorConfig) -> Self {
        Self {
            config,
            normalizer: PunctuationNormalizer::new().with_enabled(config.fix_french_punctuation),
            timestamp: None,
        }
    }

    /// Use a fixed creation/modification time (milliseconds since epoch).
    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Assemble the deck.
    pub fn build(
        &self,
        document_id: &str,
        directives: &DirectiveMap,
        sections: &Deduplicated,
        record: Option<&SongMetadata>,
    ) -> Show {
        let show_id = hash::short_id(document_id, ID_LEN);
        let layout_id = hash::short_id(&format!("layout{}", document_id), ID_LEN);

        let slide_ids: Vec<String> = sections
            .unique()
            .iter()
            .enumerate()
            .map(|(index, section)| slide_id(section, index))
            .collect();

        let slides: BTreeMap<String, Slide> = sections
            .unique()
            .iter()
            .zip(&slide_ids)
            .map(|(section, id)| (id.clone(), self.build_slide(section)))
            .collect();

        let layout = Layout {
            name: self.config.layout_name.clone(),
            notes: self.config.layout_notes.clone(),
            slides: sections
                .index_map()
                .iter()
                .map(|&index| LayoutSlide {
                    id: slide_ids[index].clone(),
                })
                .collect(),
        };

        let meta = ShowMeta::resolve(document_id, directives, record, &self.normalizer);
        let now = self
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

        log::debug!(
            "Built show {} with {} slides and {} layout entries",
            show_id,
            slides.len(),
            layout.slides.len()
        );

        Show(
            show_id,
            ShowBody {
                name: meta.title.clone(),
                origin: self.config.origin.clone(),
                private: false,
                category: self.config.category_for(document_id).to_string(),
                settings: ShowSettings {
                    active_layout: layout_id.clone(),
                    template: "default".to_string(),
                },
                timestamps: Timestamps {
                    created: now,
                    modified: now,
                    used: None,
                },
                quick_access: QuickAccess {
                    number: meta.number.clone(),
                },
                meta,
                slides,
                layouts: BTreeMap::from([(layout_id, layout)]),
                media: BTreeMap::new(),
            },
        )
    }

    fn build_slide(&self, section: &Section) -> Slide {
        let lines = section
            .display_lines()
            .map(|line| self.render_line(line))
            .collect();

        Slide {
            group: section.name.clone(),
            color: self.config.color_for(&section.section_type).to_string(),
            global_group: self
                .config
                .global_group_for(&section.section_type)
                .map(str::to_string),
            settings: BTreeMap::new(),
            notes: String::new(),
            items: vec![SlideItem {
                kind: "text".to_string(),
                lines,
                style: self.config.slide_style.clone(),
                align: String::new(),
                auto: false,
                chords: ChordSettings { enabled: false },
            }],
            section_type: section.section_type.clone(),
        }
    }

    fn render_line(&self, line: &str) -> SlideLine {
        let mut parsed = parse_chord_line(line);
        let mut offsets: Vec<usize> = parsed.chords.iter().map(|chord| chord.offset).collect();
        let value = self.normalizer.normalize_tracking(&parsed.text, &mut offsets);
        for (chord, offset) in parsed.chords.iter_mut().zip(offsets) {
            chord.offset = offset;
        }

        SlideLine {
            align: String::new(),
            text: vec![TextRun {
                value,
                style: format!("font-size: {}px;", self.config.font_size),
            }],
            chords: parsed.chords,
        }
    }
}
