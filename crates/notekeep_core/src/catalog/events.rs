//! Catalog change notifications for presentation adapters.

use crate::model::note::NoteId;

/// Mutation emitted after a catalog change has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// Contents were replaced by a directory scan.
    Reloaded { count: usize },
    Added { id: NoteId, index: usize },
    Removed { id: NoteId, index: usize },
    SampleChanged { id: NoteId, index: usize },
}

/// Callback registered through `Catalog::subscribe`.
pub type CatalogObserver = Box<dyn FnMut(&CatalogEvent)>;

#[derive(Default)]
pub(crate) struct Observers {
    callbacks: Vec<CatalogObserver>,
}

impl Observers {
    pub(crate) fn push(&mut self, observer: CatalogObserver) {
        self.callbacks.push(observer);
    }

    pub(crate) fn emit(&mut self, event: CatalogEvent) {
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}
