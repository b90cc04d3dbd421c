//! In-memory note records shown by the note list.
//!
//! # Responsibility
//! - Define the plain data shape consumed by catalog and presentation.
//! - Keep identity (`NoteId`) separate from derived display fields.
//!
//! # Invariants
//! - A `NoteId` is also the file stem of the note on disk.
//! - `sample` is always derived from content, never edited directly.

pub mod note;
