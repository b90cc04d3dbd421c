//! Runtime configuration for the note core.
//!
//! # Responsibility
//! - Describe where notes live and how the catalog reacts to failures.
//! - Provide defaults matching the desktop application layout.
//!
//! # Invariants
//! - Core code never reads environment variables; callers build these structs.

use std::path::PathBuf;

/// Default notes directory, relative to the process working directory.
pub const DEFAULT_NOTES_DIR: &str = "notes";

/// Filesystem store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub notes_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
        }
    }
}

impl StoreConfig {
    pub fn with_notes_dir(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
        }
    }
}

/// What `Catalog::create_new` does with its in-memory record when the
/// backing file cannot be created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreateFailurePolicy {
    /// Remove the record again; catalog membership matches the directory.
    #[default]
    Rollback,
    /// Leave the record in place without a file; a later save creates it.
    KeepPending,
}

/// Catalog behaviour settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    pub create_failure: CreateFailurePolicy,
}
