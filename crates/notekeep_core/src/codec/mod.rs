//! Content codec for rich-text note bodies.
//!
//! # Responsibility
//! - Normalize editor markup before it is written to disk.
//! - Derive the short plain-text sample shown in the note list.
//!
//! # Invariants
//! - Samples are never empty and never longer than `SAMPLE_MAX_CHARS`.
//! - Storage normalization only inserts newlines after paragraph closes.

use crate::model::note::{EMPTY_SAMPLE, SAMPLE_MAX_CHARS};
use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraph-close tag that marks a line boundary in stored files.
pub const PARAGRAPH_CLOSE: &str = "</p>";

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup tag regex"));
static CHAR_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[^;]*;").expect("valid character entity regex"));

/// Appends a newline after every `</p>` so stored files read line by line.
pub fn normalize_for_storage(raw: &str) -> String {
    raw.replace(PARAGRAPH_CLOSE, "</p>\n")
}

/// Derives the list sample from note content.
///
/// Rules, applied in order:
/// - paragraph-close newline insertion (same as storage normalization)
/// - markup tags removed
/// - each character entity replaced by one space
/// - truncated to the first `SAMPLE_MAX_CHARS` characters
/// - one trailing paragraph break dropped
///
/// Empty results collapse to `EMPTY_SAMPLE`.
pub fn derive_sample(raw: &str) -> String {
    let with_breaks = normalize_for_storage(raw);
    let without_tags = MARKUP_TAG_RE.replace_all(&with_breaks, "");
    let plain = CHAR_ENTITY_RE.replace_all(&without_tags, " ");
    let truncated: String = plain.chars().take(SAMPLE_MAX_CHARS).collect();
    let sample = truncated.strip_suffix('\n').unwrap_or(&truncated);
    if sample.is_empty() {
        EMPTY_SAMPLE.to_string()
    } else {
        sample.to_string()
    }
}

/// Scan-time sample from a note file's first line; `None` means an empty file.
pub fn first_line_sample(first_line: Option<&str>) -> String {
    match first_line {
        Some(line) => derive_sample(line),
        None => EMPTY_SAMPLE.to_string(),
    }
}
