//! Lenient JSON records on top of a key-value store
//!
//! Loading never fails:
//! - Absent record → defaults
//! - Unreadable store or corrupt JSON → defaults (logged)
//! - Parsed object with missing or mistyped fields → field-wise repair

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::platform::storage::{KeyValueStore, StorageError};

/// A value persisted as one JSON document under a fixed key
pub trait Record: Serialize + DeserializeOwned + Default {
    /// Storage key
    const KEY: &'static str;

    /// Rebuild from an object that failed strict deserialization, keeping
    /// every field that still parses. The default keeps nothing.
    fn repair(fields: &Map<String, Value>) -> Self {
        let _ = fields;
        Self::default()
    }
}

/// Load a record, falling back as described in the module docs
pub fn load<R: Record>(store: &dyn KeyValueStore) -> R {
    let text = match store.load(R::KEY) {
        Ok(Some(text)) => text,
        Ok(None) => {
            log::info!("No saved {}, starting fresh", R::KEY);
            return R::default();
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", R::KEY, e);
            return R::default();
        }
    };

    let fields = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            log::warn!("Saved {} is not an object ({}), resetting", R::KEY, other);
            return R::default();
        }
        Err(e) => {
            log::warn!("Saved {} is corrupt, resetting: {}", R::KEY, e);
            return R::default();
        }
    };

    match serde_json::from_value::<R>(Value::Object(fields.clone())) {
        Ok(record) => {
            log::info!("Loaded {}", R::KEY);
            record
        }
        Err(e) => {
            log::warn!("Repairing saved {}: {}", R::KEY, e);
            R::repair(&fields)
        }
    }
}

/// Serialize and write a record
pub fn save<R: Record>(store: &mut dyn KeyValueStore, record: &R) -> Result<(), StorageError> {
    let json =
        serde_json::to_string(record).map_err(|e| StorageError::Rejected(e.to_string()))?;
    store.save(R::KEY, &json)
}

/// Parse one field of a damaged object, defaulting when absent or mistyped
pub fn salvage<T: DeserializeOwned + Default>(fields: &Map<String, Value>, name: &str) -> T {
    match fields.get(name) {
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("Dropping invalid field {}: {}", name, e);
            T::default()
        }),
        None => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        count: u32,
        name: String,
    }

    impl Record for Sample {
        const KEY: &'static str = "sample";

        fn repair(fields: &Map<String, Value>) -> Self {
            Self {
                count: salvage(fields, "count"),
                name: salvage(fields, "name"),
            }
        }
    }

    #[test]
    fn test_absent_is_default() {
        let store = MemoryStore::new();
        assert_eq!(load::<Sample>(&store), Sample::default());
    }

    #[test]
    fn test_corrupt_is_default() {
        let store = MemoryStore::with_value("sample", "{not json");
        assert_eq!(load::<Sample>(&store), Sample::default());
        let store = MemoryStore::with_value("sample", "[1,2]");
        assert_eq!(load::<Sample>(&store), Sample::default());
    }

    #[test]
    fn test_mistyped_field_repaired() {
        let store = MemoryStore::with_value("sample", r#"{"count":"seven","name":"ok"}"#);
        let sample: Sample = load(&store);
        assert_eq!(sample.count, 0);
        assert_eq!(sample.name, "ok");
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let sample = Sample {
            count: 3,
            name: "x".to_string(),
        };
        save(&mut store, &sample).unwrap();
        assert_eq!(load::<Sample>(&store), sample);
    }
}
