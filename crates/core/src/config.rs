//! Processor configuration.
//!
//! All lookup tables (label rules, colors, global groups) live here and are
//! handed to the resolver and deck builder explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::section_type::{default_label_rules, LabelRule};
use crate::types::SectionType;

/// Maps a document-id prefix to a show category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub prefix: String,
    pub category: String,
}

impl CategoryRule {
    pub fn new(prefix: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            category: category.into(),
        }
    }
}

fn default_section_colors() -> BTreeMap<String, String> {
    [
        (SectionType::Verse, ""),
        (SectionType::Chorus, "#f525d2"),
        (SectionType::Bridge, "#f52598"),
        (SectionType::PreChorus, "#25d2f5"),
        (SectionType::Tag, "#f5d225"),
        (SectionType::Intro, ""),
        (SectionType::Outro, ""),
    ]
    .into_iter()
    .map(|(section_type, color)| (section_type.as_str().to_string(), color.to_string()))
    .collect()
}

fn default_global_groups() -> BTreeMap<String, String> {
    SectionType::CANONICAL
        .iter()
        .map(|section_type| {
            (
                section_type.as_str().to_string(),
                section_type.as_str().to_string(),
            )
        })
        .collect()
}

fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("jemk", "JEM Kids"),
        CategoryRule::new("jem", "JEM"),
    ]
}

/// Configuration for the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Apply the French non-breaking space rule.
    pub fix_french_punctuation: bool,

    /// Collapse content-identical sections into one slide.
    pub deduplicate_sections: bool,

    /// Ordered label table; first substring match wins.
    pub label_rules: Vec<LabelRule>,

    /// Slide color per section type keyword.
    pub section_colors: BTreeMap<String, String>,

    /// Global group per section type keyword.
    pub global_groups: BTreeMap<String, String>,

    /// CSS placement of the text item on every slide.
    pub slide_style: String,

    /// Font size of lyric lines, in pixels.
    pub font_size: u32,

    pub origin: String,
    pub layout_name: String,
    pub layout_notes: String,

    /// Category used when no rule matches.
    pub default_category: String,

    /// Ordered, case-insensitive document-id prefix rules.
    pub category_rules: Vec<CategoryRule>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            fix_french_punctuation: true,
            deduplicate_sections: true,
            label_rules: default_label_rules(),
            section_colors: default_section_colors(),
            global_groups: default_global_groups(),
            slide_style: "top:120px;left:50px;height:840px;width:1820px;".to_string(),
            font_size: 100,
            origin: "chordpro".to_string(),
            layout_name: "Default".to_string(),
            layout_notes: String::new(),
            default_category: "song".to_string(),
            category_rules: default_category_rules(),
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from a `.json`, `.yaml` or `.yml` file.
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let text = std::fs::read_to_string(path)?;
        let config: Self = match extension.as_str() {
            "json" => {
                serde_json::from_str(&text).map_err(|e| Error::ConfigFormat(e.to_string()))?
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|e| Error::ConfigFormat(e.to_string()))?
            }
            other => {
                return Err(Error::Config(format!(
                    "unsupported configuration file format: '{}'",
                    other
                )))
            }
        };

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.font_size == 0 {
            return Err(Error::Config("font_size must be positive".to_string()));
        }

        if let Some(rule) = self.label_rules.iter().find(|r| r.pattern.trim().is_empty()) {
            return Err(Error::Config(format!(
                "label rule for '{}' has an empty pattern",
                rule.section_type
            )));
        }

        if self.category_rules.iter().any(|r| r.prefix.is_empty()) {
            return Err(Error::Config(
                "category rule has an empty prefix".to_string(),
            ));
        }

        Ok(())
    }

    /// Display color for a section type; empty when unmapped.
    pub fn color_for(&self, section_type: &SectionType) -> &str {
        self.section_colors
            .get(section_type.as_str())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Global group reference for a section type, if mapped.
    pub fn global_group_for(&self, section_type: &SectionType) -> Option<&str> {
        self.global_groups
            .get(section_type.as_str())
            .map(String::as_str)
    }

    /// Show category for a document id.
    pub fn category_for(&self, document_id: &str) -> &str {
        let id = document_id.to_lowercase();
        self.category_rules
            .iter()
            .find(|rule| id.starts_with(&rule.prefix.to_lowercase()))
            .map(|rule| rule.category.as_str())
            .unwrap_or(self.default_category.as_str())
    }
}
