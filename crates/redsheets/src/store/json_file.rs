//! File-backed collection store.
//!
//! A collection lives in `<data_dir>/<kind>s.json` as a pretty-printed JSON
//! array. The id sequence lives next to it in `<kind>s.seq.json`. Writes go
//! to a temporary sibling and are renamed into place.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{Collection, RecordStore};
use crate::error::{Error, Result};
use crate::record::{Kind, Record};

/// Contents of the sequence sidecar.
#[derive(Debug, Serialize, Deserialize)]
struct SequenceFile {
    last_id: u64,
}

/// A [`RecordStore`] backed by a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    kind: Kind,
    path: PathBuf,
    sequence_path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for `kind` inside `data_dir`. Nothing is touched on disk.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>, kind: Kind) -> Self {
        let data_dir = data_dir.as_ref();
        let file = kind.collection_file();
        let stem = file.strip_suffix(".json").unwrap_or(file);
        Self {
            kind,
            path: data_dir.join(file),
            sequence_path: data_dir.join(format!("{stem}.seq.json")),
        }
    }

    /// Path to the collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path to the sequence sidecar.
    #[must_use]
    pub fn sequence_path(&self) -> &Path {
        &self.sequence_path
    }

    fn read_records(&self) -> Result<Vec<Record>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e))?;
        let Value::Array(items) = value else {
            return Err(self.corrupt("expected a JSON array"));
        };
        items
            .into_iter()
            .map(|item| Record::from_value(item).map_err(|e| self.corrupt(e)))
            .collect()
    }

    fn read_sequence(&self) -> Result<Option<u64>> {
        match fs::read(&self.sequence_path) {
            Ok(bytes) => {
                let seq: SequenceFile =
                    serde_json::from_slice(&bytes).map_err(|e| Error::StoreCorrupt {
                        path: self.sequence_path.clone(),
                        message: e.to_string(),
                    })?;
                Ok(Some(seq.last_id))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::StoreRead {
                path: self.sequence_path.clone(),
                source,
            }),
        }
    }

    fn corrupt(&self, message: impl ToString) -> Error {
        Error::StoreCorrupt {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }
}

/// Write `bytes` to `path` by way of a temporary sibling file.
///
/// The temporary file is flushed to disk before the rename, so a crash
/// leaves either the old collection or the new one in place.
fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    written
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|source| Error::StoreWrite {
            path: path.to_path_buf(),
            source,
        })
}

impl RecordStore for JsonFileStore {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if !self.path.exists() {
            write_replace(&self.path, b"[]")?;
            info!("Created empty {} collection at {}", self.kind, self.path.display());
        }
        Ok(())
    }

    fn load(&self) -> Result<Collection> {
        let records = self.read_records()?;
        let stored_last_id = self.read_sequence()?;
        debug!(
            "Loaded {} {} records from {}",
            records.len(),
            self.kind,
            self.path.display()
        );
        Ok(Collection::new(records, stored_last_id))
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        let body = serde_json::to_vec_pretty(&collection.records)?;
        write_replace(&self.path, &body)?;

        let seq = serde_json::to_vec(&SequenceFile {
            last_id: collection.last_id,
        })?;
        write_replace(&self.sequence_path, &seq)?;

        debug!(
            "Saved {} {} records to {}",
            collection.len(),
            self.kind,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path(), Kind::Character)
    }

    #[test]
    fn test_paths() {
        let store = JsonFileStore::new("data", Kind::Crew);
        assert_eq!(store.path(), Path::new("data/crews.json"));
        assert_eq!(store.sequence_path(), Path::new("data/crews.seq.json"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collection = store_in(&dir).load().unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.last_id, 0);
    }

    #[test]
    fn test_init_creates_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let store = JsonFileStore::new(&nested, Kind::Vehicle);

        store.init().unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(!store.sequence_path().exists());
    }

    #[test]
    fn test_init_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"[{"id": 1}]"#).unwrap();

        store.init().unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut collection = Collection::default();
        let mut record = Record::from_value(json!({"handle": "Вектор"})).unwrap();
        record.set_id(collection.allocate_id());
        collection.records.push(record);

        store.save(&collection).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, collection);
    }

    #[test]
    fn test_saved_file_is_pretty_and_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let record = Record::from_value(json!({"id": 1, "handle": "Вектор"})).unwrap();
        store.save(&Collection::new(vec![record], None)).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("Вектор"));
        assert!(text.contains("\n  {"));
        assert!(!dir.path().join("characters.json.tmp").exists());
    }

    #[test]
    fn test_write_replace_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crews.json");
        fs::write(&path, "[{\"id\": 1}]").unwrap();
        fs::write(dir.path().join("crews.json.tmp"), "stale").unwrap();

        write_replace(&path, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(!dir.path().join("crews.json.tmp").exists());
    }

    #[test]
    fn test_write_replace_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("crews.json");

        let err = write_replace(&path, b"[]").unwrap_err();
        assert!(matches!(err, Error::StoreWrite { .. }));
        assert!(err.to_string().contains("crews.json"));
    }

    #[test]
    fn test_sequence_survives_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut collection = Collection::default();
        for _ in 0..3 {
            let mut record = Record::new();
            record.set_id(collection.allocate_id());
            collection.records.push(record);
        }
        collection.records.pop();
        store.save(&collection).unwrap();

        let mut loaded = store.load().unwrap();
        assert_eq!(loaded.allocate_id(), 4);
    }

    #[test]
    fn test_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::StoreCorrupt { .. }));
        assert!(err.to_string().contains("characters.json"));
    }

    #[test]
    fn test_non_array_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"id": 1}"#).unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[test]
    fn test_non_object_item_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "[1, 2]").unwrap();

        assert!(matches!(store.load(), Err(Error::StoreCorrupt { .. })));
    }
}
