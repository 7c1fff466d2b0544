//! WASM-compatible wrapper for song markup conversion.
//!
//! This crate exposes the conversion pipeline to JavaScript
//! for use in Cloudflare Workers.

use chordshow_core::{MetadataTable, SongProcessor};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of converting one song.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// The FreeShow show as a `[id, body]` JSON value.
    pub show: serde_json::Value,
    /// Enhanced markup text.
    pub enhanced: String,
    /// Number of slides in presentation order.
    pub slide_count: usize,
    /// Number of distinct slides after deduplication.
    pub unique_slide_count: usize,
    pub warnings: Vec<String>,
}

/// Convert song markup into a FreeShow show.
///
/// # Arguments
/// * `text` - The markup source
/// * `document_id` - The song id (usually the file stem)
/// * `metadata_csv` - Optional metadata table text
///
/// # Returns
/// A JavaScript object with the conversion result, or throws on error.
#[wasm_bindgen]
pub fn convert_song(
    text: &str,
    document_id: &str,
    metadata_csv: Option<String>,
) -> Result<JsValue, JsValue> {
    let result = convert_song_impl(text, document_id, metadata_csv.as_deref())
        .map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn convert_song_impl(
    text: &str,
    document_id: &str,
    metadata_csv: Option<&str>,
) -> Result<ConversionResult, String> {
    if document_id.trim().is_empty() {
        return Err("Document id must not be empty".to_string());
    }

    let table = match metadata_csv {
        Some(csv) => MetadataTable::parse(csv).map_err(|e| format!("Metadata error: {}", e))?,
        None => MetadataTable::new(),
    };

    let conversion = SongProcessor::default().convert(document_id, text, table.get(document_id));
    let show = conversion
        .show
        .to_json_value()
        .map_err(|e| format!("Serialization error: {}", e))?;

    Ok(ConversionResult {
        slide_count: conversion.section_count(),
        unique_slide_count: conversion.slide_count(),
        show,
        enhanced: conversion.enhanced,
        warnings: conversion.warnings,
    })
}
