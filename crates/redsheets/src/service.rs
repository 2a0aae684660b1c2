//! Entity services.
//!
//! An [`EntityService`] wraps one kind's [`RecordStore`] with the
//! create-or-update, lookup, list and delete operations the web surface
//! needs. Mutations for one kind are serialized so that two concurrent
//! saves can neither lose an update nor receive the same id.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{Kind, Record, RecordId};
use crate::store::{JsonFileStore, MemoryStore, RecordStore};

/// Format of `created_at`: local time, microsecond precision, no offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time in the `created_at` format.
#[must_use]
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Outcome of [`EntityService::upsert`].
#[derive(Debug, Clone, PartialEq)]
pub enum Saved {
    /// Appended with a fresh id.
    Created(u64),
    /// Replaced the stored record with this id.
    Replaced(u64),
    /// The submitted id matched no stored record; nothing was written.
    Unmatched(Value),
}

impl Saved {
    /// The stored id, if a record was written.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Created(id) | Self::Replaced(id) => Some(*id),
            Self::Unmatched(_) => None,
        }
    }

    /// The id reported back to the client: the stored id, or the submitted
    /// one as it arrived when nothing matched.
    #[must_use]
    pub fn id_value(&self) -> Value {
        match self {
            Self::Created(id) | Self::Replaced(id) => Value::from(*id),
            Self::Unmatched(raw) => raw.clone(),
        }
    }
}

/// Create, update, look up and delete records of one kind.
#[derive(Debug)]
pub struct EntityService {
    kind: Kind,
    store: Arc<dyn RecordStore>,
    write_lock: Mutex<()>,
}

impl EntityService {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            kind: store.kind(),
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The kind this service manages.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::internal(format!("{} write lock poisoned", self.kind)))
    }

    /// Create or replace a record.
    ///
    /// A record without an id (or with a falsy one) is appended with a
    /// fresh id and `created_at`. A record whose id matches a stored record
    /// replaces it in place, field for field; nothing from the old record is
    /// carried over. A record naming an id that is not stored leaves the
    /// collection untouched and comes back as [`Saved::Unmatched`].
    ///
    /// # Errors
    ///
    /// Returns a store error if the collection cannot be read or written.
    pub fn upsert(&self, mut record: Record) -> Result<Saved> {
        let _guard = self.lock()?;
        let mut collection = self.store.load()?;

        let saved = match record.raw_id().filter(|_| record.has_id()) {
            Some(raw) => {
                let key = RecordId::from_value(raw);
                let found = collection
                    .records
                    .iter()
                    .enumerate()
                    .find_map(|(i, r)| r.id().filter(|_| key.matches(r)).map(|id| (i, id)));
                let Some((position, id)) = found else {
                    warn!("Save of {} {} matched no stored record; nothing written", self.kind, key);
                    return Ok(Saved::Unmatched(raw.clone()));
                };
                record.set_id(id);
                collection.records[position] = record;
                debug!("Replacing {} {} at position {}", self.kind, id, position);
                Saved::Replaced(id)
            }
            None => {
                let id = collection.allocate_id();
                record.set_id(id);
                record.set_created_at(now_timestamp());
                collection.records.push(record);
                Saved::Created(id)
            }
        };

        self.store.save(&collection)?;
        info!("Saved {} {:?}", self.kind, saved);
        Ok(saved)
    }

    /// Find a record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        let collection = self.store.load()?;
        Ok(collection.records.into_iter().find(|r| id.matches(r)))
    }

    /// Find a record by id, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record matches, or a store error.
    pub fn require(&self, id: &RecordId) -> Result<Record> {
        self.get(id)?
            .ok_or_else(|| Error::not_found(self.kind, id))
    }

    /// All records in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn list(&self) -> Result<Vec<Record>> {
        Ok(self.store.load()?.records)
    }

    /// Remove every record with the given id.
    ///
    /// Returns whether anything was removed. Removing an id that is not
    /// stored succeeds without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn delete(&self, id: u64) -> Result<bool> {
        let _guard = self.lock()?;
        let mut collection = self.store.load()?;

        let before = collection.len();
        collection.records.retain(|r| r.id() != Some(id));
        if collection.len() == before {
            debug!("Delete of {} {} matched nothing", self.kind, id);
            return Ok(false);
        }

        self.store.save(&collection)?;
        info!("Deleted {} {}", self.kind, id);
        Ok(true)
    }
}

/// One [`EntityService`] per kind.
#[derive(Debug, Clone)]
pub struct Services {
    character: Arc<EntityService>,
    vehicle: Arc<EntityService>,
    crew: Arc<EntityService>,
}

impl Services {
    /// Build services over file stores in `data_dir`, creating empty
    /// collections for every kind that has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or a collection file cannot
    /// be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let store = |kind| -> Result<Arc<dyn RecordStore>> {
            let store = JsonFileStore::new(data_dir, kind);
            store.init()?;
            Ok(Arc::new(store))
        };
        let services = Self::from_stores(
            store(Kind::Character)?,
            store(Kind::Vehicle)?,
            store(Kind::Crew)?,
        )?;
        info!("Collections ready in {}", data_dir.display());
        Ok(services)
    }

    /// Build services over empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        let service = |kind| Arc::new(EntityService::new(Arc::new(MemoryStore::new(kind))));
        Self {
            character: service(Kind::Character),
            vehicle: service(Kind::Vehicle),
            crew: service(Kind::Crew),
        }
    }

    /// Build services over the given stores.
    ///
    /// # Errors
    ///
    /// Returns an error if a store is passed in the wrong position.
    pub fn from_stores(
        character: Arc<dyn RecordStore>,
        vehicle: Arc<dyn RecordStore>,
        crew: Arc<dyn RecordStore>,
    ) -> Result<Self> {
        for (expected, store) in Kind::ALL.iter().zip([&character, &vehicle, &crew]) {
            if store.kind() != *expected {
                return Err(Error::internal(format!(
                    "{} store passed where {} store was expected",
                    store.kind(),
                    expected
                )));
            }
        }
        Ok(Self {
            character: Arc::new(EntityService::new(character)),
            vehicle: Arc::new(EntityService::new(vehicle)),
            crew: Arc::new(EntityService::new(crew)),
        })
    }

    /// The service for `kind`.
    #[must_use]
    pub fn get(&self, kind: Kind) -> &Arc<EntityService> {
        match kind {
            Kind::Character => &self.character,
            Kind::Vehicle => &self.vehicle,
            Kind::Crew => &self.crew,
        }
    }
}
