//! Note catalog service.
//!
//! # Responsibility
//! - Keep the ordered in-memory note list in step with a `NoteStore`.
//! - Serve list, create, save, delete and load use-cases to the UI layer.
//!
//! # Invariants
//! - Record ids are unique within the catalog.
//! - Order is scan/insertion order; the catalog never sorts.
//! - Deletion touches the store first and memory only after success.
//! - Store failures are returned unchanged, without retries.

mod events;

pub use events::{CatalogEvent, CatalogObserver};

use crate::codec::derive_sample;
use crate::config::{CatalogConfig, CreateFailurePolicy};
use crate::model::note::{NoteId, NoteRecord};
use crate::store::{NoteStore, StoreError, StoreResult};
use events::Observers;
use log::{info, warn};
use std::path::PathBuf;

/// Outcome of `Catalog::initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub loaded: usize,
    /// Note files skipped because they could not be read.
    pub unreadable: Vec<PathBuf>,
}

impl ScanReport {
    pub fn has_failures(&self) -> bool {
        !self.unreadable.is_empty()
    }

    /// One aggregated warning naming every unreadable file, if any.
    pub fn warning_message(&self) -> Option<String> {
        if self.unreadable.is_empty() {
            return None;
        }
        let mut message = String::from("We can't load these notes right now:");
        for path in &self.unreadable {
            message.push('\n');
            message.push_str(&path.display().to_string());
        }
        Some(message)
    }
}

/// Ordered note list backed by a store.
pub struct Catalog<S: NoteStore> {
    store: S,
    config: CatalogConfig,
    records: Vec<NoteRecord>,
    observers: Observers,
}

impl<S: NoteStore> Catalog<S> {
    /// Creates an empty catalog; call `initialize` to load existing notes.
    pub fn new(store: S, config: CatalogConfig) -> Self {
        Self {
            store,
            config,
            records: Vec::new(),
            observers: Observers::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn records(&self) -> &[NoteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    pub fn get(&self, id: &NoteId) -> Option<&NoteRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Registers a change callback. Callbacks run synchronously after each
    /// applied mutation, in registration order.
    pub fn subscribe(&mut self, observer: CatalogObserver) {
        self.observers.push(observer);
    }

    /// Replaces the catalog contents with a fresh directory scan.
    ///
    /// # Errors
    /// - Returns `DirectoryUnreadable` when the notes directory cannot be
    ///   listed; the catalog is left untouched in that case.
    pub fn initialize(&mut self) -> StoreResult<ScanReport> {
        let scan = self.store.list()?;
        self.records = scan
            .entries
            .into_iter()
            .map(|entry| NoteRecord::with_parts(entry.id, entry.sample, entry.created_at))
            .collect();

        let report = ScanReport {
            loaded: self.records.len(),
            unreadable: scan.unreadable,
        };
        if report.has_failures() {
            warn!(
                "event=catalog_init module=catalog status=partial loaded={} unreadable={}",
                report.loaded,
                report.unreadable.len()
            );
        } else {
            info!(
                "event=catalog_init module=catalog status=ok loaded={}",
                report.loaded
            );
        }
        self.observers.emit(CatalogEvent::Reloaded {
            count: report.loaded,
        });
        Ok(report)
    }

    /// Adds a new note with a generated id and creates its empty file.
    ///
    /// The record is appended before the file exists. When creation fails,
    /// `CreateFailurePolicy` decides whether it is removed again.
    ///
    /// # Errors
    /// - Returns `CreateFailed` from the store unchanged.
    pub fn create_new(&mut self) -> StoreResult<NoteRecord> {
        let record = NoteRecord::new_default(NoteId::generate());
        self.records.push(record.clone());
        let index = self.records.len() - 1;

        if let Err(err) = self.store.create(&record.id) {
            match self.config.create_failure {
                CreateFailurePolicy::Rollback => {
                    self.records.remove(index);
                    warn!(
                        "event=catalog_create module=catalog status=error policy=rollback id={}",
                        record.id
                    );
                }
                CreateFailurePolicy::KeepPending => {
                    warn!(
                        "event=catalog_create module=catalog status=error policy=keep_pending id={}",
                        record.id
                    );
                    self.observers.emit(CatalogEvent::Added {
                        id: record.id.clone(),
                        index,
                    });
                }
            }
            return Err(err);
        }

        info!(
            "event=catalog_create module=catalog status=ok id={} size={}",
            record.id,
            self.records.len()
        );
        self.observers.emit(CatalogEvent::Added {
            id: record.id.clone(),
            index,
        });
        Ok(record)
    }

    /// Persists note content, then refreshes the matching record's sample.
    ///
    /// Only ids present in the catalog are written, so a save never adds a
    /// file the catalog does not track. Pending records count as present.
    ///
    /// # Errors
    /// - Returns `NotFound` without touching the store for unknown ids.
    /// - Returns `WriteFailed` from the store; the record is left unchanged.
    pub fn save_selected(&mut self, id: &NoteId, content: &str) -> StoreResult<()> {
        if self.position(id).is_none() {
            warn!(
                "event=catalog_save module=catalog status=error id={} reason=not_in_catalog",
                id
            );
            return Err(StoreError::NotFound {
                id: id.clone(),
                path: self.store.note_path(id),
            });
        }
        self.store.save(id, content)?;
        self.apply_sample(id, derive_sample(content));
        Ok(())
    }

    /// Updates the sample from live editor content without persisting it.
    ///
    /// Returns `false` when no record has this id.
    pub fn refresh_sample(&mut self, id: &NoteId, live_content: &str) -> bool {
        self.apply_sample(id, derive_sample(live_content))
    }

    /// Deletes the note file, then removes the first matching record.
    ///
    /// # Errors
    /// - Returns `NotFound` or `DeleteFailed`; the catalog is unchanged.
    pub fn delete_selected(&mut self, id: &NoteId) -> StoreResult<()> {
        self.store.delete(id)?;
        match self.position(id) {
            Some(index) => {
                self.records.remove(index);
                info!(
                    "event=catalog_delete module=catalog status=ok id={} size={}",
                    id,
                    self.records.len()
                );
                self.observers.emit(CatalogEvent::Removed {
                    id: id.clone(),
                    index,
                });
            }
            None => warn!(
                "event=catalog_delete module=catalog status=orphan id={} reason=not_in_catalog",
                id
            ),
        }
        Ok(())
    }

    /// Reads full note content; never mutates the catalog.
    pub fn load_content(&self, id: &NoteId) -> StoreResult<String> {
        self.store.load(id)
    }

    fn apply_sample(&mut self, id: &NoteId, sample: String) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let record = &mut self.records[index];
        if record.sample != sample {
            record.sample = sample;
            self.observers.emit(CatalogEvent::SampleChanged {
                id: id.clone(),
                index,
            });
        }
        true
    }
}

impl<S: NoteStore> std::fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .field("records", &self.records)
            .field("observers", &self.observers.len())
            .finish()
    }
}
