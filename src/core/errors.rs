// src/core/errors.rs

//! Defines the primary error type for the entire crate.

use std::num::ParseIntError;
use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the cache.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug, Clone)]
pub enum OpalCacheError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    /// A transport-level failure talking to the metadata store. Aborts the
    /// refresh that observed it; live maps keep their prior values.
    #[error("Metadata store error: {0}")]
    Store(String),

    /// A key returned by a children listing yielded no record or stat on a
    /// strict fetch.
    #[error("Missing expected entry at '{0}'")]
    MissingEntry(String),

    /// The metadata store rejected a write-back.
    #[error("Write rejected for '{0}'")]
    WriteRejected(String),

    #[error("Value is not an integer or out of range")]
    NotAnInteger,

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Operation not allowed in the current state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PartialEq for OpalCacheError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OpalCacheError::Io(e1), OpalCacheError::Io(e2)) => e1.to_string() == e2.to_string(),
            (OpalCacheError::Store(s1), OpalCacheError::Store(s2)) => s1 == s2,
            (OpalCacheError::MissingEntry(s1), OpalCacheError::MissingEntry(s2)) => s1 == s2,
            (OpalCacheError::WriteRejected(s1), OpalCacheError::WriteRejected(s2)) => s1 == s2,
            (OpalCacheError::MalformedRecord(s1), OpalCacheError::MalformedRecord(s2)) => s1 == s2,
            (OpalCacheError::InvalidState(s1), OpalCacheError::InvalidState(s2)) => s1 == s2,
            (OpalCacheError::Config(s1), OpalCacheError::Config(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for OpalCacheError {
    fn from(e: std::io::Error) -> Self {
        OpalCacheError::Io(Arc::new(e))
    }
}

impl From<ParseIntError> for OpalCacheError {
    fn from(_: ParseIntError) -> Self {
        OpalCacheError::NotAnInteger
    }
}

impl From<serde_json::Error> for OpalCacheError {
    fn from(e: serde_json::Error) -> Self {
        OpalCacheError::MalformedRecord(e.to_string())
    }
}

impl From<config::ConfigError> for OpalCacheError {
    fn from(e: config::ConfigError) -> Self {
        OpalCacheError::Config(e.to_string())
    }
}
