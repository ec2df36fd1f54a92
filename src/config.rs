// src/config.rs

//! Manages cache configuration: loading from TOML and the environment, with
//! serde-level defaults for every field.

use crate::core::errors::OpalCacheError;
use serde::{Deserialize, Serialize};

/// Tunables for the refresh path.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshConfig {
    /// Warn when a single refresh issues more full-record current-state
    /// fetches than this. `0` disables the check.
    #[serde(default = "default_fetch_warn_threshold")]
    pub fetch_warn_threshold: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            fetch_warn_threshold: default_fetch_warn_threshold(),
        }
    }
}

fn default_fetch_warn_threshold() -> usize {
    100_000
}

fn default_cluster_name() -> String {
    "default-cluster".to_string()
}

/// Top-level configuration of one cache instance.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheConfig {
    /// The cluster this cache mirrors.
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,
    /// Whether the task sub-cache participates in refresh. Controllers
    /// running the main pipeline leave this off.
    #[serde(default)]
    pub task_cache: bool,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            task_cache: false,
            refresh: RefreshConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Loads configuration from an optional TOML file, with `OPALCACHE_*`
    /// environment variables layered on top.
    pub fn load(path: Option<&str>) -> Result<Self, OpalCacheError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("OPALCACHE"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
