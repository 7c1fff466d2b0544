//! Error types for song conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur around the conversion pipeline.
///
/// Markup parsing itself never fails; these cover configuration, the
/// metadata table and deck validation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read a configuration or metadata file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// A configuration value is out of range or the file type is unknown.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configuration file could not be decoded.
    #[error("Configuration decode error: {0}")]
    ConfigFormat(String),

    /// The metadata table is missing its key column.
    #[error("Metadata table error: {0}")]
    Metadata(String),

    /// The assembled deck does not satisfy the show schema.
    #[error("Show validation failed: {0}")]
    Validation(String),

    /// JSON serialization of the deck failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
