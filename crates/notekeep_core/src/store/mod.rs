//! Note persistence contracts.
//!
//! # Responsibility
//! - Define the storage operations the catalog relies on.
//! - Define typed failure kinds for every storage operation.
//!
//! # Invariants
//! - Store implementations never retry or swallow I/O failures, except that
//!   `list` collects unreadable files instead of aborting the scan.
//! - Every resource opened by an operation is released before it returns.

use crate::model::note::NoteId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod fs_store;

pub use fs_store::{FsNoteStore, NOTE_EXTENSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure category of a `StoreError`, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    DirectoryUnreadable,
    CreateFailed,
    NotFound,
    ReadFailed,
    WriteFailed,
    DeleteFailed,
}

/// Storage failure surfaced unchanged to catalog callers.
#[derive(Debug)]
pub enum StoreError {
    /// The notes directory cannot be listed.
    DirectoryUnreadable { path: PathBuf, source: io::Error },
    /// The notes directory or the note file could not be created.
    CreateFailed {
        id: NoteId,
        path: PathBuf,
        source: io::Error,
    },
    /// No backing file exists for the id.
    NotFound { id: NoteId, path: PathBuf },
    ReadFailed {
        id: NoteId,
        path: PathBuf,
        source: io::Error,
    },
    WriteFailed {
        id: NoteId,
        path: PathBuf,
        source: io::Error,
    },
    DeleteFailed {
        id: NoteId,
        path: PathBuf,
        source: io::Error,
    },
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::DirectoryUnreadable { .. } => StoreErrorKind::DirectoryUnreadable,
            Self::CreateFailed { .. } => StoreErrorKind::CreateFailed,
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::ReadFailed { .. } => StoreErrorKind::ReadFailed,
            Self::WriteFailed { .. } => StoreErrorKind::WriteFailed,
            Self::DeleteFailed { .. } => StoreErrorKind::DeleteFailed,
        }
    }

    /// Note id the failure refers to; `None` for directory-level failures.
    pub fn note_id(&self) -> Option<&NoteId> {
        match self {
            Self::DirectoryUnreadable { .. } => None,
            Self::CreateFailed { id, .. }
            | Self::NotFound { id, .. }
            | Self::ReadFailed { id, .. }
            | Self::WriteFailed { id, .. }
            | Self::DeleteFailed { id, .. } => Some(id),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryUnreadable { path, source } => {
                write!(f, "cannot list notes directory `{}`: {source}", path.display())
            }
            Self::CreateFailed { id, path, source } => write!(
                f,
                "cannot create note {id} at `{}`: {source}",
                path.display()
            ),
            Self::NotFound { id, path } => {
                write!(f, "note {id} not found at `{}`", path.display())
            }
            Self::ReadFailed { id, path, source } => {
                write!(f, "cannot read note {id} at `{}`: {source}", path.display())
            }
            Self::WriteFailed { id, path, source } => {
                write!(f, "cannot write note {id} at `{}`: {source}", path.display())
            }
            Self::DeleteFailed { id, path, source } => write!(
                f,
                "cannot delete note {id} at `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DirectoryUnreadable { source, .. }
            | Self::CreateFailed { source, .. }
            | Self::ReadFailed { source, .. }
            | Self::WriteFailed { source, .. }
            | Self::DeleteFailed { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

/// One note found by a directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedNote {
    pub id: NoteId,
    /// Sample derived from the first line of the file only.
    pub sample: String,
    /// File creation time in Unix epoch milliseconds.
    pub created_at: i64,
}

/// Result of a best-effort directory scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteScan {
    /// Readable notes, ordered by file name.
    pub entries: Vec<ScannedNote>,
    /// Note files that could not be read.
    pub unreadable: Vec<PathBuf>,
}

/// Storage contract used by `Catalog`.
///
/// Implementations assume single-threaded access to their backing storage.
pub trait NoteStore {
    /// Location of the note backing `id`, whether or not it exists.
    fn note_path(&self, id: &NoteId) -> PathBuf;
    /// Enumerates all notes, collecting per-file failures in `unreadable`.
    fn list(&self) -> StoreResult<NoteScan>;
    /// Creates an empty note, creating the notes directory when missing.
    fn create(&self, id: &NoteId) -> StoreResult<()>;
    /// Reads full note content with stored lines joined back together.
    fn load(&self, id: &NoteId) -> StoreResult<String>;
    /// Normalizes and fully overwrites note content.
    fn save(&self, id: &NoteId, content: &str) -> StoreResult<()>;
    fn delete(&self, id: &NoteId) -> StoreResult<()>;
}

impl<S: NoteStore + ?Sized> NoteStore for &S {
    fn note_path(&self, id: &NoteId) -> PathBuf {
        (**self).note_path(id)
    }

    fn list(&self) -> StoreResult<NoteScan> {
        (**self).list()
    }

    fn create(&self, id: &NoteId) -> StoreResult<()> {
        (**self).create(id)
    }

    fn load(&self, id: &NoteId) -> StoreResult<String> {
        (**self).load(id)
    }

    fn save(&self, id: &NoteId, content: &str) -> StoreResult<()> {
        (**self).save(id, content)
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        (**self).delete(id)
    }
}
