//! Filesystem-backed note store.
//!
//! # Responsibility
//! - Map note ids to `<notes_dir>/<id>.note` files.
//! - Scan the notes directory into list-ready entries.
//!
//! # Invariants
//! - This is the only code in the core that touches the filesystem.
//! - Writes replace the whole file; there is no append or atomic rename.
//! - Ids are derived from file stems, never from fixed path offsets.

use super::{NoteScan, NoteStore, ScannedNote, StoreError, StoreResult};
use crate::codec::{first_line_sample, normalize_for_storage};
use crate::config::StoreConfig;
use crate::model::note::NoteId;
use log::{debug, error, info, warn};
use std::ffi::OsStr;
use std::fs::{self, File, Metadata};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// File extension of note files, without the leading dot.
pub const NOTE_EXTENSION: &str = "note";

/// Note store rooted at one notes directory.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    config: StoreConfig,
}

impl FsNoteStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn notes_dir(&self) -> &Path {
        self.config.notes_dir.as_path()
    }

    fn ensure_notes_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.config.notes_dir)
    }
}

impl Default for FsNoteStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl NoteStore for FsNoteStore {
    fn note_path(&self, id: &NoteId) -> PathBuf {
        self.config
            .notes_dir
            .join(format!("{}.{NOTE_EXTENSION}", id.as_str()))
    }

    fn list(&self) -> StoreResult<NoteScan> {
        let started_at = Instant::now();
        let dir = self.notes_dir();
        debug!(
            "event=notes_list module=store status=start dir={}",
            dir.display()
        );

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                error!(
                    "event=notes_list module=store status=error duration_ms={} error_code=dir_unreadable dir={} error={}",
                    started_at.elapsed().as_millis(),
                    dir.display(),
                    source
                );
                return Err(StoreError::DirectoryUnreadable {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let paths = entries.map(|entry| entry.map(|entry| entry.path()));
        let (candidates, failed_entries) = partition_candidates(dir, paths);
        let mut scan = NoteScan {
            entries: Vec::new(),
            unreadable: failed_entries,
        };
        for path in candidates {
            match scan_note_file(&path) {
                Ok(Some(note)) => scan.entries.push(note),
                Ok(None) => debug!(
                    "event=notes_list module=store status=skip reason=directory path={}",
                    path.display()
                ),
                Err(failure) => {
                    warn!(
                        "event=notes_list module=store status=partial reason={} path={}",
                        failure,
                        path.display()
                    );
                    scan.unreadable.push(path);
                }
            }
        }

        info!(
            "event=notes_list module=store status=ok duration_ms={} loaded={} unreadable={}",
            started_at.elapsed().as_millis(),
            scan.entries.len(),
            scan.unreadable.len()
        );
        Ok(scan)
    }

    fn create(&self, id: &NoteId) -> StoreResult<()> {
        let started_at = Instant::now();
        log_start("note_create", id);
        let path = self.note_path(id);

        let result = self
            .ensure_notes_dir()
            .map_err(|source| StoreError::CreateFailed {
                id: id.clone(),
                path: self.config.notes_dir.clone(),
                source,
            })
            .and_then(|()| {
                fs::write(&path, b"").map_err(|source| StoreError::CreateFailed {
                    id: id.clone(),
                    path: path.clone(),
                    source,
                })
            });

        log_outcome("note_create", id, started_at, &result);
        result
    }

    fn load(&self, id: &NoteId) -> StoreResult<String> {
        let started_at = Instant::now();
        log_start("note_load", id);
        let path = self.note_path(id);
        let result = read_joined_lines(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    id: id.clone(),
                    path: path.clone(),
                }
            } else {
                StoreError::ReadFailed {
                    id: id.clone(),
                    path: path.clone(),
                    source,
                }
            }
        });

        log_outcome("note_load", id, started_at, &result);
        result
    }

    fn save(&self, id: &NoteId, content: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        log_start("note_save", id);
        let path = self.note_path(id);
        let normalized = normalize_for_storage(content);

        let result = self
            .ensure_notes_dir()
            .and_then(|()| fs::write(&path, normalized.as_bytes()))
            .map_err(|source| StoreError::WriteFailed {
                id: id.clone(),
                path: path.clone(),
                source,
            });

        log_outcome("note_save", id, started_at, &result);
        result
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        let started_at = Instant::now();
        log_start("note_delete", id);
        let path = self.note_path(id);
        let result = fs::remove_file(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    id: id.clone(),
                    path: path.clone(),
                }
            } else {
                StoreError::DeleteFailed {
                    id: id.clone(),
                    path: path.clone(),
                    source,
                }
            }
        });

        log_outcome("note_delete", id, started_at, &result);
        result
    }
}

/// Why a single note file was left out of a scan.
enum ScanFailure {
    Io(io::Error),
    /// File stem is not valid UTF-8 or not a usable note id.
    BadName,
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io_error({err})"),
            Self::BadName => write!(f, "bad_file_name"),
        }
    }
}

/// Splits directory entries into sorted note paths and unreadable entries.
///
/// An entry that fails before its name is known is reported as `dir`.
fn partition_candidates(
    dir: &Path,
    entries: impl IntoIterator<Item = io::Result<PathBuf>>,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut candidates = Vec::new();
    let mut failed = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if has_note_extension(&path) => candidates.push(path),
            Ok(_) => {}
            Err(err) => {
                warn!(
                    "event=notes_list module=store status=partial reason=io_error({}) path={}",
                    err,
                    dir.display()
                );
                failed.push(dir.to_path_buf());
            }
        }
    }
    // read_dir order is platform-defined; sort so repeated scans agree.
    candidates.sort();
    (candidates, failed)
}

fn has_note_extension(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(NOTE_EXTENSION))
}

fn scan_note_file(path: &Path) -> Result<Option<ScannedNote>, ScanFailure> {
    let metadata = fs::metadata(path).map_err(ScanFailure::Io)?;
    if metadata.is_dir() {
        return Ok(None);
    }

    let id = note_id_from_path(path).ok_or(ScanFailure::BadName)?;
    let first_line = read_first_line(path).map_err(ScanFailure::Io)?;

    Ok(Some(ScannedNote {
        id,
        sample: first_line_sample(first_line.as_deref()),
        created_at: created_epoch_ms(&metadata),
    }))
}

fn note_id_from_path(path: &Path) -> Option<NoteId> {
    let stem = path.file_stem()?.to_str()?;
    NoteId::parse(stem).ok()
}

fn read_first_line(path: &Path) -> io::Result<Option<String>> {
    let reader = BufReader::new(File::open(path)?);
    reader.lines().next().transpose()
}

fn read_joined_lines(path: &Path) -> io::Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let mut content = String::new();
    for line in reader.lines() {
        content.push_str(&line?);
    }
    Ok(content)
}

/// Creation time when the platform reports it, modification time otherwise.
fn created_epoch_ms(metadata: &Metadata) -> i64 {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(system_time_to_epoch_ms)
        .unwrap_or(0)
}

fn system_time_to_epoch_ms(at: SystemTime) -> i64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

fn log_start(event: &str, id: &NoteId) {
    debug!("event={event} module=store status=start id={id}");
}

fn log_outcome<T>(event: &str, id: &NoteId, started_at: Instant, result: &StoreResult<T>) {
    match result {
        Ok(_) => info!(
            "event={event} module=store status=ok duration_ms={} id={id}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=store status=error duration_ms={} id={id} error_kind={:?} error={err}",
            started_at.elapsed().as_millis(),
            err.kind()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        has_note_extension, note_id_from_path, partition_candidates, system_time_to_epoch_ms,
        FsNoteStore,
    };
    use crate::config::StoreConfig;
    use crate::model::note::NoteId;
    use crate::store::NoteStore;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn note_path_joins_id_and_extension() {
        let store = FsNoteStore::new(StoreConfig::with_notes_dir("/tmp/notes"));
        let id = NoteId::parse("abc").unwrap();
        assert_eq!(store.note_path(&id), Path::new("/tmp/notes/abc.note"));
    }

    #[test]
    fn extension_match_is_exact() {
        assert!(has_note_extension(Path::new("notes/a.note")));
        assert!(!has_note_extension(Path::new("notes/a.note.bak")));
        assert!(!has_note_extension(Path::new("notes/a.notes")));
        assert!(!has_note_extension(Path::new("notes/.note")));
    }

    #[test]
    fn id_comes_from_file_stem_regardless_of_directory_depth() {
        let id = note_id_from_path(Path::new("/var/data/deep/notes/u1.note")).unwrap();
        assert_eq!(id.as_str(), "u1");
        assert!(note_id_from_path(Path::new("notes/...note")).is_none());
    }

    #[test]
    fn failing_directory_entry_is_reported_without_dropping_others() {
        let dir = Path::new("/data/notes");
        let entries = vec![
            Ok(dir.join("b.note")),
            Err(io::Error::other("stale handle")),
            Ok(dir.join("skip.txt")),
            Ok(dir.join("a.note")),
        ];

        let (candidates, failed) = partition_candidates(dir, entries);

        assert_eq!(candidates, vec![dir.join("a.note"), dir.join("b.note")]);
        assert_eq!(failed, vec![PathBuf::from("/data/notes")]);
    }

    #[test]
    fn epoch_conversion_handles_both_sides_of_epoch() {
        assert_eq!(
            system_time_to_epoch_ms(UNIX_EPOCH + Duration::from_millis(1500)),
            1500
        );
        assert_eq!(
            system_time_to_epoch_ms(UNIX_EPOCH - Duration::from_millis(20)),
            -20
        );
    }
}
