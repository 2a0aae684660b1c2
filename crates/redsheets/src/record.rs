//! Core record types for redsheets.
//!
//! A [`Record`] is one free-form game sheet: a JSON object whose only
//! reserved keys are `id` and `created_at`. Every record belongs to exactly
//! one [`Kind`], which selects its collection and its templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Reserved key holding the record id.
pub const ID_FIELD: &str = "id";

/// Reserved key holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";

/// The kind of sheet a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// A player character or NPC.
    Character,
    /// A vehicle sheet.
    Vehicle,
    /// A crew of hired hands.
    Crew,
}

impl Kind {
    /// Every kind, in the order collections are initialized.
    pub const ALL: [Kind; 3] = [Kind::Character, Kind::Vehicle, Kind::Crew];

    /// Singular identifier used in URLs and file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Vehicle => "vehicle",
            Self::Crew => "crew",
        }
    }

    /// Plural identifier used for list pages.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Character => "characters",
            Self::Vehicle => "vehicles",
            Self::Crew => "crews",
        }
    }

    /// File name of the collection backing this kind.
    #[must_use]
    pub fn collection_file(self) -> &'static str {
        match self {
            Self::Character => "characters.json",
            Self::Vehicle => "vehicles.json",
            Self::Crew => "crews.json",
        }
    }

    /// Heading used on list pages.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Character => "Персонажи",
            Self::Vehicle => "Транспорт",
            Self::Crew => "Шестерки",
        }
    }

    /// Body of the 404 returned when an export target does not exist.
    #[must_use]
    pub fn not_found_message(self) -> &'static str {
        match self {
            Self::Character => "Персонаж не найден",
            Self::Vehicle => "Транспорт не найден",
            Self::Crew => "Шестерка не найдена",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "character" => Ok(Self::Character),
            "vehicle" => Ok(Self::Vehicle),
            "crew" => Ok(Self::Crew),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

/// Key used to look a record up.
///
/// Ids arrive as numbers from JSON bodies and as text from URLs and query
/// strings; each compares against the stored id in its own way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
    /// Compared numerically against the stored id.
    Number(u64),
    /// Compared against the textual form of the stored id.
    Text(String),
}

impl RecordId {
    /// Build a lookup key from a JSON value submitted as an id.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_u64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Whether `record` carries this id.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Number(n) => record.id() == Some(*n),
            Self::Text(text) => record.id_text().as_deref() == Some(text.as_str()),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Resolve a dotted path against a JSON object.
///
/// Object segments are keys; array segments are zero-based indices.
#[must_use]
pub fn lookup_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// One stored sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a JSON value as a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(Self(serde_json::from_value(value)?))
    }

    /// Parse a record from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    /// The stored id, if it is a non-negative integer.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.0.get(ID_FIELD).and_then(Value::as_u64)
    }

    /// The raw `id` value as submitted.
    #[must_use]
    pub fn raw_id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Textual form of the id, used for comparisons against URL input.
    #[must_use]
    pub fn id_text(&self) -> Option<String> {
        match self.0.get(ID_FIELD)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whether the record carries an id that selects an update.
    ///
    /// `null`, `0`, `false` and the empty string all count as no id.
    #[must_use]
    pub fn has_id(&self) -> bool {
        match self.0.get(ID_FIELD) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    /// Set the id.
    pub fn set_id(&mut self, id: u64) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    /// The creation timestamp, if present.
    #[must_use]
    pub fn created_at(&self) -> Option<&str> {
        self.0.get(CREATED_AT_FIELD).and_then(Value::as_str)
    }

    /// Set the creation timestamp.
    pub fn set_created_at(&mut self, timestamp: impl Into<String>) {
        self.0
            .insert(CREATED_AT_FIELD.to_string(), Value::String(timestamp.into()));
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a top-level field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Look up a dotted path such as `stats.int` or `weapons.0.name`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.0, path)
    }

    /// A human label for list pages: the handle, then the name, then the id.
    #[must_use]
    pub fn label(&self) -> String {
        ["handle", "name"]
            .iter()
            .filter_map(|field| self.0.get(*field).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map_or_else(
                || format!("#{}", self.id_text().unwrap_or_default()),
                str::to_string,
            )
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a plain JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_kind_round_trip_names() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_unknown() {
        let err = "widget".parse::<Kind>().unwrap_err();
        assert!(matches!(err, Error::UnknownKind(ref s) if s == "widget"));
    }

    #[test]
    fn test_kind_collection_files() {
        assert_eq!(Kind::Character.collection_file(), "characters.json");
        assert_eq!(Kind::Vehicle.collection_file(), "vehicles.json");
        assert_eq!(Kind::Crew.collection_file(), "crews.json");
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&Kind::Crew).unwrap(), "\"crew\"");
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(Record::from_value(json!([1, 2])).is_err());
        assert!(Record::from_value(json!("text")).is_err());
    }

    #[test]
    fn test_has_id_truthiness() {
        assert!(!record(json!({})).has_id());
        assert!(!record(json!({"id": null})).has_id());
        assert!(!record(json!({"id": 0})).has_id());
        assert!(!record(json!({"id": ""})).has_id());
        assert!(record(json!({"id": 3})).has_id());
        assert!(record(json!({"id": "3"})).has_id());
    }

    #[test]
    fn test_id_text() {
        assert_eq!(record(json!({"id": 12})).id_text().as_deref(), Some("12"));
        assert_eq!(record(json!({"id": "12"})).id_text().as_deref(), Some("12"));
        assert_eq!(record(json!({"id": null})).id_text(), None);
    }

    #[test]
    fn test_record_id_matches_number_and_text() {
        let stored = record(json!({"id": 4, "handle": "Vex"}));
        assert!(RecordId::Number(4).matches(&stored));
        assert!(RecordId::from("4").matches(&stored));
        assert!(!RecordId::Number(5).matches(&stored));
        assert!(!RecordId::from("04").matches(&stored));
    }

    #[test]
    fn test_number_does_not_match_string_id() {
        let stored = record(json!({"id": "4"}));
        assert!(!RecordId::Number(4).matches(&stored));
        assert!(RecordId::from("4").matches(&stored));
    }

    #[test]
    fn test_record_id_from_value() {
        assert_eq!(RecordId::from_value(&json!(9)), RecordId::Number(9));
        assert_eq!(RecordId::from_value(&json!("9")), RecordId::from("9"));
        assert_eq!(RecordId::from_value(&json!(-1)), RecordId::from("-1"));
    }

    #[test]
    fn test_lookup_paths() {
        let r = record(json!({
            "stats": {"int": 6},
            "weapons": [{"name": "Malorian Arms 3516"}]
        }));
        assert_eq!(r.lookup("stats.int"), Some(&json!(6)));
        assert_eq!(r.lookup("weapons.0.name"), Some(&json!("Malorian Arms 3516")));
        assert_eq!(r.lookup("weapons.1.name"), None);
        assert_eq!(r.lookup("stats.int.deeper"), None);
        assert_eq!(r.lookup("missing"), None);
    }

    #[test]
    fn test_label_prefers_handle() {
        assert_eq!(record(json!({"id": 1, "handle": "Vex", "name": "V"})).label(), "Vex");
        assert_eq!(record(json!({"id": 1, "handle": " ", "name": "Delamain"})).label(), "Delamain");
        assert_eq!(record(json!({"id": 1})).label(), "#1");
    }

    #[test]
    fn test_set_reserved_fields() {
        let mut r = Record::new();
        r.set_id(3);
        r.set_created_at("2026-01-01T00:00:00.000000");
        assert_eq!(r.id(), Some(3));
        assert_eq!(r.created_at(), Some("2026-01-01T00:00:00.000000"));
    }
}
