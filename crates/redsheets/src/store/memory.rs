//! In-memory collection store, used by tests and the offline CLI.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Collection, RecordStore};
use crate::error::{Error, Result};
use crate::record::{Kind, Record};

/// A [`RecordStore`] that keeps its collection in memory.
#[derive(Debug)]
pub struct MemoryStore {
    kind: Kind,
    collection: Mutex<Collection>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(kind: Kind) -> Self {
        Self::with_records(kind, Vec::new())
    }

    /// Create a store pre-populated with records.
    #[must_use]
    pub fn with_records(kind: Kind, records: Vec<Record>) -> Self {
        Self {
            kind,
            collection: Mutex::new(Collection::new(records, None)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times [`RecordStore::save`] has been called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RecordStore for MemoryStore {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn load(&self) -> Result<Collection> {
        self.collection
            .lock()
            .map(|c| c.clone())
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        let mut guard = self
            .collection
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))?;
        *guard = collection.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
