// src/core/store/memory.rs

//! An in-memory [`MetadataStore`] over `DashMap`, used by the test suite and
//! for running a controller against local state.
//!
//! Besides the contract itself it offers what a test harness needs: per-
//! category operation counters, direct removal, a write-reject switch, and
//! phantom children (names a listing returns without a backing record, to
//! exercise the listed-but-missing recovery path).

use super::MetadataStore;
use crate::core::errors::OpalCacheError;
use crate::core::keys::{KeyBuilder, PropertyKey};
use crate::core::record::{RecordStat, StoreRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Per-category operation counters, readable by tests to assert how many
/// round-trips a refresh actually issued.
#[derive(Debug, Default)]
pub struct OpCounters {
    child_lists: DashMap<&'static str, u64>,
    record_reads: DashMap<&'static str, u64>,
    writes: DashMap<&'static str, u64>,
    stat_reads: AtomicU64,
}

impl OpCounters {
    fn bump(map: &DashMap<&'static str, u64>, category: &'static str, by: u64) {
        *map.entry(category).or_insert(0) += by;
    }

    /// Children/child-values listings issued for a category.
    pub fn child_lists(&self, category: &str) -> u64 {
        self.child_lists.get(category).map(|v| *v).unwrap_or(0)
    }

    /// Individual full-record reads requested for a category, across `get`,
    /// `get_batch`, and `child_values`.
    pub fn record_reads(&self, category: &str) -> u64 {
        self.record_reads.get(category).map(|v| *v).unwrap_or(0)
    }

    /// Writes issued for a category.
    pub fn writes(&self, category: &str) -> u64 {
        self.writes.get(category).map(|v| *v).unwrap_or(0)
    }

    /// Individual stat reads requested, all categories.
    pub fn stat_reads(&self) -> u64 {
        self.stat_reads.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.child_lists.clear();
        self.record_reads.clear();
        self.writes.clear();
        self.stat_reads.store(0, Ordering::Relaxed);
    }
}

/// The in-memory store. Cheap to clone state into and inspect; stamps stats
/// the way the real store would (per-key version counter plus store-wide
/// creation/modification counters).
#[derive(Debug)]
pub struct MemoryStore {
    keys: KeyBuilder,
    records: DashMap<PropertyKey, StoreRecord>,
    phantoms: DashMap<PropertyKey, Vec<String>>,
    counters: OpCounters,
    txn_counter: AtomicI64,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new(cluster: &str) -> Self {
        Self {
            keys: KeyBuilder::new(cluster),
            records: DashMap::new(),
            phantoms: DashMap::new(),
            counters: OpCounters::default(),
            txn_counter: AtomicI64::new(0),
            reject_writes: AtomicBool::new(false),
        }
    }

    pub fn counters(&self) -> &OpCounters {
        &self.counters
    }

    /// Removes a record outright, as an external deletion would.
    pub fn remove(&self, key: &PropertyKey) -> Option<StoreRecord> {
        self.records.remove(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.records.contains_key(key)
    }

    /// Reads a record without counting it as a store round-trip.
    pub fn peek(&self, key: &PropertyKey) -> Option<StoreRecord> {
        self.records.get(key).map(|r| r.clone())
    }

    /// Registers a child name the parent listing will return even though no
    /// record exists under it. Simulates an entry deleted between the
    /// listing and the follow-up fetch.
    pub fn add_phantom_child(&self, parent: &PropertyKey, name: &str) {
        self.phantoms
            .entry(parent.clone())
            .or_default()
            .push(name.to_string());
    }

    pub fn clear_phantom_children(&self) {
        self.phantoms.clear();
    }

    /// Makes subsequent writes come back unaccepted (`Ok(false)`).
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }

    fn list_children(&self, parent: &PropertyKey) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .filter(|entry| {
                entry.key().cluster == parent.cluster
                    && entry.key().kind.parent().as_ref() == Some(&parent.kind)
            })
            .filter_map(|entry| entry.key().kind.leaf_name().map(String::from))
            .collect();
        if let Some(extra) = self.phantoms.get(parent) {
            names.extend(extra.iter().cloned());
        }
        names.sort();
        names.dedup();
        names
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    fn key_builder(&self) -> &KeyBuilder {
        &self.keys
    }

    async fn children(&self, parent: &PropertyKey) -> Result<Vec<String>, OpalCacheError> {
        OpCounters::bump(&self.counters.child_lists, parent.kind.category(), 1);
        Ok(self.list_children(parent))
    }

    async fn child_values(
        &self,
        parent: &PropertyKey,
        strict: bool,
    ) -> Result<HashMap<String, StoreRecord>, OpalCacheError> {
        let category = parent.kind.category();
        OpCounters::bump(&self.counters.child_lists, category, 1);
        let mut out = HashMap::new();
        for name in self.list_children(parent) {
            let Some(key) = parent.child(&name) else {
                continue;
            };
            OpCounters::bump(&self.counters.record_reads, category, 1);
            match self.records.get(&key) {
                Some(record) => {
                    out.insert(name, record.clone());
                }
                None if strict => return Err(OpalCacheError::MissingEntry(key.path())),
                None => {}
            }
        }
        Ok(out)
    }

    async fn get(&self, key: &PropertyKey) -> Result<Option<StoreRecord>, OpalCacheError> {
        OpCounters::bump(&self.counters.record_reads, key.kind.category(), 1);
        Ok(self.records.get(key).map(|r| r.clone()))
    }

    async fn get_batch(
        &self,
        keys: &[PropertyKey],
        strict: bool,
    ) -> Result<Vec<Option<StoreRecord>>, OpalCacheError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            OpCounters::bump(&self.counters.record_reads, key.kind.category(), 1);
            let record = self.records.get(key).map(|r| r.clone());
            if record.is_none() && strict {
                return Err(OpalCacheError::MissingEntry(key.path()));
            }
            out.push(record);
        }
        Ok(out)
    }

    async fn get_stats(
        &self,
        keys: &[PropertyKey],
    ) -> Result<Vec<Option<RecordStat>>, OpalCacheError> {
        self.counters
            .stat_reads
            .fetch_add(keys.len() as u64, Ordering::Relaxed);
        Ok(keys
            .iter()
            .map(|key| self.records.get(key).map(|r| r.stat))
            .collect())
    }

    async fn set(&self, key: &PropertyKey, mut record: StoreRecord) -> Result<bool, OpalCacheError> {
        OpCounters::bump(&self.counters.writes, key.kind.category(), 1);
        if self.reject_writes.load(Ordering::Relaxed) {
            return Ok(false);
        }
        let txn = self.txn_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let prior = self.records.get(key).map(|r| r.stat);
        record.stat = RecordStat {
            version: prior.map(|s| s.version + 1).unwrap_or(1),
            created: prior.map(|s| s.created).unwrap_or(txn),
            modified: txn,
            size: record.payload_size(),
        };
        self.records.insert(key.clone(), record);
        Ok(true)
    }
}
