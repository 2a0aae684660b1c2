//! Storage layer for redsheets.
//!
//! Each [`Kind`] owns one collection: an ordered JSON array of records. A
//! [`RecordStore`] loads and saves a whole collection at a time; it enforces
//! nothing about record contents. Id allocation state travels with the
//! collection so that deleted ids are never handed out again.

pub mod json_file;
pub mod memory;

use std::fmt::Debug;

use crate::error::Result;
use crate::record::{Kind, Record};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Persistence for one kind's collection.
pub trait RecordStore: Send + Sync + Debug {
    /// The kind this store holds.
    fn kind(&self) -> Kind;

    /// Materialize an empty collection if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be created.
    fn init(&self) -> Result<()>;

    /// Load the whole collection. A missing collection loads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or parsed.
    fn load(&self) -> Result<Collection>;

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    fn save(&self, collection: &Collection) -> Result<()>;
}

/// An ordered collection of records plus the last id it handed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Records in insertion order.
    pub records: Vec<Record>,
    /// Highest id ever issued for this collection.
    pub last_id: u64,
}

impl Collection {
    /// Build a collection, reconciling a stored sequence value with the records.
    ///
    /// The sequence never falls below the collection length or the largest
    /// stored id, so a missing or stale sequence cannot cause a collision.
    #[must_use]
    pub fn new(records: Vec<Record>, stored_last_id: Option<u64>) -> Self {
        let len = u64::try_from(records.len()).unwrap_or(u64::MAX);
        let max_id = records.iter().filter_map(Record::id).max().unwrap_or(0);
        let last_id = stored_last_id.unwrap_or(0).max(len).max(max_id);
        Self { records, last_id }
    }

    /// Reserve the next id.
    pub fn allocate_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_ids(ids: &[u64]) -> Vec<Record> {
        ids.iter()
            .map(|id| Record::from_value(json!({ "id": id })).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_collection_starts_at_one() {
        let mut collection = Collection::default();
        assert!(collection.is_empty());
        assert_eq!(collection.allocate_id(), 1);
        assert_eq!(collection.allocate_id(), 2);
    }

    #[test]
    fn test_sequence_seeded_from_records() {
        let collection = Collection::new(with_ids(&[1, 2, 7]), None);
        assert_eq!(collection.last_id, 7);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_sequence_seeded_from_length() {
        let records = vec![
            Record::from_value(json!({"id": "a"})).unwrap(),
            Record::from_value(json!({"id": "b"})).unwrap(),
        ];
        let collection = Collection::new(records, None);
        assert_eq!(collection.last_id, 2);
    }

    #[test]
    fn test_stored_sequence_wins_when_higher() {
        let mut collection = Collection::new(with_ids(&[1, 2]), Some(5));
        assert_eq!(collection.allocate_id(), 6);
    }

    #[test]
    fn test_stale_sequence_is_raised() {
        let collection = Collection::new(with_ids(&[1, 9]), Some(3));
        assert_eq!(collection.last_id, 9);
    }
}
