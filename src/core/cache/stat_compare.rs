// src/core/cache/stat_compare.rs

//! The version-compared incremental reload shared by the current-state and
//! instance-messages sub-caches.

use crate::core::errors::OpalCacheError;
use crate::core::keys::PropertyKey;
use crate::core::metrics;
use crate::core::record::TypedRecord;
use crate::core::store::MetadataStore;
use std::collections::HashMap;
use tracing::{debug, warn};

/// What an incremental reload did, for logging and threshold warnings.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ReloadStats {
    /// Entries carried forward on an unchanged stat.
    pub retained: usize,
    /// Full records fetched (new keys, changed stats, bucketed records).
    pub fetched: usize,
    /// Keys a listing returned but whose record or stat had vanished by the
    /// follow-up fetch. Retried on the next refresh.
    pub vanished: usize,
}

/// Rebuilds an entry store for `expected` keys against `previous`.
///
/// New keys are fetched outright. Keys already cached are stat-checked in one
/// batch; an entry is carried forward only if it is non-bucketed and its stat
/// is unchanged. Everything else is re-fetched in a second batch. Keys whose
/// record is gone by fetch time are dropped with a warning; only expected
/// keys ever enter the result, which is what evicts stale entries.
pub(crate) async fn reload_stat_compared<T>(
    store: &dyn MetadataStore,
    expected: Vec<PropertyKey>,
    previous: &HashMap<PropertyKey, T>,
) -> Result<(HashMap<PropertyKey, T>, ReloadStats), OpalCacheError>
where
    T: TypedRecord + Clone,
{
    let mut next = HashMap::with_capacity(expected.len());
    let mut stats = ReloadStats::default();

    let mut reload_keys = Vec::new();
    let mut maybe_cached = Vec::new();
    for key in expected {
        if previous.contains_key(&key) {
            maybe_cached.push(key);
        } else {
            reload_keys.push(key);
        }
    }

    let fresh_stats = store.get_stats(&maybe_cached).await?;
    metrics::STAT_CHECKS_TOTAL.inc_by(maybe_cached.len() as u64);
    for (key, fresh) in maybe_cached.into_iter().zip(fresh_stats) {
        match fresh {
            None => {
                warn!("stat for listed entry '{}' is gone, reloading", key.path());
                reload_keys.push(key);
            }
            Some(fresh) => {
                let cached = &previous[&key];
                if cached.bucket_size() == 0 && *cached.stat() == fresh {
                    metrics::STAT_HITS_TOTAL.inc();
                    stats.retained += 1;
                    next.insert(key, cached.clone());
                } else {
                    reload_keys.push(key);
                }
            }
        }
    }

    let records = store.get_batch(&reload_keys, false).await?;
    for (key, record) in reload_keys.into_iter().zip(records) {
        match record {
            Some(record) => {
                metrics::RECORD_RELOADS_TOTAL.inc();
                stats.fetched += 1;
                next.insert(key, T::from_record(record));
            }
            None => {
                stats.vanished += 1;
                warn!(
                    "listed entry '{}' vanished before fetch, will retry on next refresh",
                    key.path()
                );
            }
        }
    }

    debug!(
        retained = stats.retained,
        fetched = stats.fetched,
        vanished = stats.vanished,
        "incremental reload complete"
    );
    Ok((next, stats))
}
