// src/core/store/mod.rs

//! The metadata-store accessor contract the cache is built against, plus a
//! first-party in-memory implementation.

pub mod memory;

pub use memory::{MemoryStore, OpCounters};

use crate::core::errors::OpalCacheError;
use crate::core::keys::{KeyBuilder, PropertyKey};
use crate::core::record::{RecordStat, StoreRecord};
use async_trait::async_trait;
use std::collections::HashMap;

/// Handle to the hierarchical metadata store.
///
/// Every read is a remote round-trip; batch variants return results
/// positionally aligned with the input key list. Individual missing entries
/// come back as `None` under lenient reads; `strict` reads turn a missing
/// child of a just-listed parent into [`OpalCacheError::MissingEntry`].
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// The key builder scoped to this store's cluster.
    fn key_builder(&self) -> &KeyBuilder;

    /// Names listed under a category path.
    async fn children(&self, parent: &PropertyKey) -> Result<Vec<String>, OpalCacheError>;

    /// Batch fetch of all children of a category path, keyed by child name.
    async fn child_values(
        &self,
        parent: &PropertyKey,
        strict: bool,
    ) -> Result<HashMap<String, StoreRecord>, OpalCacheError>;

    /// Single fetch; `None` means the record does not exist.
    async fn get(&self, key: &PropertyKey) -> Result<Option<StoreRecord>, OpalCacheError>;

    /// Batch fetch, positionally aligned with `keys`.
    async fn get_batch(
        &self,
        keys: &[PropertyKey],
        strict: bool,
    ) -> Result<Vec<Option<StoreRecord>>, OpalCacheError>;

    /// Batch fetch of version metadata only, positionally aligned with `keys`.
    async fn get_stats(
        &self,
        keys: &[PropertyKey],
    ) -> Result<Vec<Option<RecordStat>>, OpalCacheError>;

    /// Writes a record; returns whether the store accepted the write.
    async fn set(&self, key: &PropertyKey, record: StoreRecord) -> Result<bool, OpalCacheError>;
}
