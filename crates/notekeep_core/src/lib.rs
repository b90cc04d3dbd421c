//! Note catalog and persistence core for NoteKeep.
//! This crate owns every rule about how notes map to files on disk.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod store;

pub use catalog::{Catalog, CatalogEvent, CatalogObserver, ScanReport};
pub use codec::{derive_sample, first_line_sample, normalize_for_storage};
pub use config::{CatalogConfig, CreateFailurePolicy, StoreConfig, DEFAULT_NOTES_DIR};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::note::{
    NoteId, NoteIdError, NoteRecord, DEFAULT_SAMPLE, EMPTY_SAMPLE, SAMPLE_MAX_CHARS,
};
pub use store::{
    FsNoteStore, NoteScan, NoteStore, ScannedNote, StoreError, StoreErrorKind, StoreResult,
    NOTE_EXTENSION,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
