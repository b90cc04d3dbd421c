//! Note record model.
//!
//! # Responsibility
//! - Carry one note's identity plus list-display metadata.
//! - Generate fresh identifiers for newly created notes.
//!
//! # Invariants
//! - `id` never changes after the record is created.
//! - `sample` holds at most `SAMPLE_MAX_CHARS` characters and is never empty.
//! - `modified_at` is Unix epoch milliseconds.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Sample shown for a note that has just been created.
pub const DEFAULT_SAMPLE: &str = "New Note";
/// Sample shown when a note's content yields no visible text.
pub const EMPTY_SAMPLE: &str = " ";
/// Upper bound for sample length, in characters.
pub const SAMPLE_MAX_CHARS: usize = 20;

const DISPLAY_DATE_FORMAT: &str = "%Y/%m/%d";

/// Opaque note identifier, doubling as the note file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

/// Rejection reason for ids that cannot be mapped to a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteIdError {
    Empty,
    /// Contains a path separator, a NUL byte, or is a dot segment.
    Unsafe(String),
}

impl Display for NoteIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "note id cannot be empty"),
            Self::Unsafe(value) => write!(f, "note id `{value}` is not a plain file name"),
        }
    }
}

impl Error for NoteIdError {}

impl NoteId {
    /// Generates a globally unique id (UUID v4, hyphenated).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing id after checking it is a safe file stem.
    ///
    /// # Errors
    /// - `NoteIdError::Empty` for blank input.
    /// - `NoteIdError::Unsafe` when the value could escape the notes directory.
    pub fn parse(value: impl Into<String>) -> Result<Self, NoteIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(NoteIdError::Empty);
        }
        if value == "." || value == ".." || value.contains(['/', '\\', '\0']) {
            return Err(NoteIdError::Unsafe(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One entry of the note list.
///
/// Plain data only; rendering belongs to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    /// Short plain-text preview of the note content.
    pub sample: String,
    /// Unix epoch milliseconds (file creation time for scanned notes).
    pub modified_at: i64,
}

impl NoteRecord {
    /// Creates the placeholder record for a brand-new note.
    pub fn new_default(id: NoteId) -> Self {
        Self {
            id,
            sample: DEFAULT_SAMPLE.to_string(),
            modified_at: now_epoch_ms(),
        }
    }

    pub fn with_parts(id: NoteId, sample: impl Into<String>, modified_at: i64) -> Self {
        Self {
            id,
            sample: sample.into(),
            modified_at,
        }
    }

    /// Formats `modified_at` as `yyyy/MM/dd` in local time.
    ///
    /// Out-of-range timestamps render as an empty string.
    pub fn display_date(&self) -> String {
        Local
            .timestamp_millis_opt(self.modified_at)
            .single()
            .map(|at| at.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{NoteId, NoteIdError, NoteRecord, DEFAULT_SAMPLE};

    #[test]
    fn generated_ids_are_unique_and_parseable() {
        let first = NoteId::generate();
        let second = NoteId::generate();
        assert_ne!(first, second);
        assert_eq!(NoteId::parse(first.as_str()).unwrap(), first);
    }

    #[test]
    fn parse_rejects_blank_and_path_like_ids() {
        assert_eq!(NoteId::parse("  ").unwrap_err(), NoteIdError::Empty);
        assert!(matches!(
            NoteId::parse("../escape"),
            Err(NoteIdError::Unsafe(_))
        ));
        assert!(matches!(NoteId::parse("a\\b"), Err(NoteIdError::Unsafe(_))));
        assert!(matches!(NoteId::parse(".."), Err(NoteIdError::Unsafe(_))));
        assert!(NoteId::parse("a1").is_ok());
    }

    #[test]
    fn default_record_uses_placeholder_sample() {
        let record = NoteRecord::new_default(NoteId::generate());
        assert_eq!(record.sample, DEFAULT_SAMPLE);
        assert!(record.modified_at > 0);
    }

    #[test]
    fn display_date_uses_slash_separated_format() {
        let record = NoteRecord::with_parts(NoteId::parse("d").unwrap(), "x", 1_700_000_000_000);
        let rendered = record.display_date();
        assert_eq!(rendered.len(), 10);
        assert_eq!(rendered.matches('/').count(), 2);
        assert!(rendered.starts_with("2023/11/1"));
    }

    #[test]
    fn record_serializes_id_as_plain_string() {
        let record = NoteRecord::with_parts(NoteId::parse("a1").unwrap(), "Hello", 42);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "id": "a1", "sample": "Hello", "modified_at": 42 })
        );
    }
}
