// src/core/mod.rs

//! The central module containing the core logic and data structures of OpalCache.

pub mod cache;
pub mod errors;
pub mod keys;
pub mod metrics;
pub mod model;
pub mod record;
pub mod store;

pub use errors::OpalCacheError;
pub use keys::{KeyBuilder, PropertyKey, PropertyKind};
pub use record::{RecordStat, StoreRecord, TypedRecord};
