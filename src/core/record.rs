// src/core/record.rs

//! The generic record format stored under every metadata-store path, and the
//! version metadata (stat) attached to it.
//!
//! Typed entities in [`crate::core::model`] are thin wrappers over a
//! [`StoreRecord`], reading their domain fields out of the three generic
//! field families. This keeps batch fetches untyped and cheap; typing happens
//! at the wrap, not on the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known field names shared between the cache and the records it wraps.
pub mod fields {
    pub const SESSION_ID: &str = "SESSION_ID";
    pub const ENABLED: &str = "ENABLED";
    pub const TAGS: &str = "TAGS";
    pub const DISABLED_PARTITIONS: &str = "DISABLED_PARTITIONS";
    pub const DISABLED_INSTANCES: &str = "DISABLED_INSTANCES";
    pub const IDEAL_STATE_RULES: &str = "IDEAL_STATE_RULES";
    pub const REPLICAS: &str = "REPLICAS";
    pub const STATE_MODEL_DEF_REF: &str = "STATE_MODEL_DEF_REF";
    pub const STATE_PRIORITY_LIST: &str = "STATE_PRIORITY_LIST";
    pub const BUCKET_SIZE: &str = "BUCKET_SIZE";
    pub const CURRENT_STATE: &str = "CURRENT_STATE";
    pub const LAST_OFFLINE_TIME: &str = "LAST_OFFLINE_TIME";
    pub const OFFLINE_HISTORY: &str = "OFFLINE_HISTORY";
    pub const TASK_TYPE: &str = "TASK_TYPE";
    pub const MSG_TYPE: &str = "MSG_TYPE";
    pub const TGT_NAME: &str = "TGT_NAME";
    pub const TGT_SESSION_ID: &str = "TGT_SESSION_ID";
    pub const RESOURCE_NAME: &str = "RESOURCE_NAME";
    pub const PARTITION_NAME: &str = "PARTITION_NAME";
    pub const FROM_STATE: &str = "FROM_STATE";
    pub const TO_STATE: &str = "TO_STATE";
    pub const RELAY_PARTICIPANT: &str = "RELAY_PARTICIPANT";
    pub const REASON: &str = "REASON";
}

/// Version metadata carried by every record fetched from the metadata store.
///
/// Two stats compare equal iff all components are equal; under an identical
/// key, equality implies the payload of a non-bucketed record is unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStat {
    /// Per-key write counter, bumped on every successful write.
    pub version: i64,
    /// Store-wide creation counter of the record.
    pub created: i64,
    /// Store-wide counter of the last modification.
    pub modified: i64,
    /// Serialized payload size in bytes.
    pub size: u64,
}

/// The unit of storage under a metadata-store path: an id plus three generic
/// field families, with the store's version metadata attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: String,
    #[serde(default)]
    pub fields: HashMap<String, String>,
    #[serde(default)]
    pub lists: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub maps: HashMap<String, HashMap<String, String>>,
    #[serde(default, skip_serializing)]
    pub stat: RecordStat,
}

impl StoreRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Reads a simple field as an integer; an absent or unparseable field is `None`.
    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(|v| v.parse().ok())
    }

    /// Reads a simple field as a boolean; an absent or unparseable field is `None`.
    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(|v| v.parse().ok())
    }

    pub fn list(&self, name: &str) -> &[String] {
        self.lists.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn push_list(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.lists.entry(name.into()).or_default().push(value.into());
    }

    pub fn map(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.maps.get(name)
    }

    pub fn set_map_entry(
        &mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.maps
            .entry(name.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// The serialized size used by the store when stamping [`RecordStat::size`].
    pub fn payload_size(&self) -> u64 {
        serde_json::to_vec(self).map(|v| v.len() as u64).unwrap_or(0)
    }
}

/// A typed view over a [`StoreRecord`]. Wrapping is infallible; domain
/// accessors surface absent or malformed fields as defaults or `None`.
pub trait TypedRecord: Sized {
    fn from_record(record: StoreRecord) -> Self;
    fn record(&self) -> &StoreRecord;
    fn into_record(self) -> StoreRecord;

    /// The record id, which doubles as the entity name for every category.
    fn name(&self) -> &str {
        &self.record().id
    }

    fn stat(&self) -> &RecordStat {
        &self.record().stat
    }

    /// Bucketed records split their logical content across sibling nodes, so a
    /// single stat compare says nothing about the whole; they are always
    /// reloaded. Non-bucketed records report 0.
    fn bucket_size(&self) -> i64 {
        self.record().int_field(fields::BUCKET_SIZE).unwrap_or(0)
    }
}
