//! redb table definition and versioned record envelopes.

use crate::constants::{CURRENT_PROJECT_KEY, CUSTOM_KEY, EDITS_KEY, PROJECTS_KEY, STATUS_KEY};
use crate::error::AppError;
use redb::TableDefinition;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "tracker.redb";

/// String-keyed, string-valued entries (one per logical table).
pub const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// Current schema version written into every table envelope.
pub const SCHEMA_VERSION: u64 = 1;

/// Logical tables persisted by the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Status,
    Edits,
    Custom,
    Projects,
    CurrentProject,
}

impl StoreKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreKey::Status => STATUS_KEY,
            StoreKey::Edits => EDITS_KEY,
            StoreKey::Custom => CUSTOM_KEY,
            StoreKey::Projects => PROJECTS_KEY,
            StoreKey::CurrentProject => CURRENT_PROJECT_KEY,
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    version: u64,
    data: &'a T,
}

pub(super) fn encode_envelope<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(&Envelope {
        version: SCHEMA_VERSION,
        data: value,
    })?)
}

/// Decode a stored table value.
///
/// Bare JSON (no envelope) is schema version 0 and decodes as-is.
pub(super) fn decode_envelope<T: DeserializeOwned>(
    key: StoreKey,
    raw: &str,
) -> Result<T, AppError> {
    let mut map = match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => map,
        other => return Ok(serde_json::from_value(other)?),
    };

    let is_envelope = map.len() == 2 && map.contains_key("version") && map.contains_key("data");
    if !is_envelope {
        return Ok(serde_json::from_value(Value::Object(map))?);
    }

    let version = map.get("version").and_then(Value::as_u64);
    if version != Some(SCHEMA_VERSION) {
        return Err(AppError::Storage(format!(
            "Unsupported schema version {:?} for '{}'",
            map.get("version"),
            key.as_str()
        )));
    }

    let data = map.remove("data").unwrap_or(Value::Null);
    Ok(serde_json::from_value(data)?)
}
