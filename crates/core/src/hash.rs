//! Content-addressed identifiers.
//!
//! Every identifier in a deck (chord ids, slide ids, show and layout ids) and
//! the section content hash come from the same SHA-256 digest, so repeated
//! conversions of the same input produce the same output.

use sha2::{Digest, Sha256};

use crate::types::is_comment_label;

/// Lowercase hex SHA-256 of `input`.
pub fn digest_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The first `len` hex characters of the digest of `input`.
pub fn short_id(input: &str, len: usize) -> String {
    let mut hex = digest_hex(input);
    hex.truncate(len);
    hex
}

/// Digest of section content, ignoring comment/label lines.
pub fn content_hash<S: AsRef<str>>(lines: &[S]) -> String {
    let kept: Vec<&str> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !is_comment_label(line))
        .collect();
    digest_hex(&kept.join("\n"))
}
