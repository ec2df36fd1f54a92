// src/core/metrics.rs

//! Defines and registers Prometheus metrics for cache monitoring.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire process lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    IntCounter, IntCounterVec, TextEncoder, register_int_counter, register_int_counter_vec,
};

lazy_static! {
    // --- Refresh counters ---
    /// The total number of refresh passes driven through the aggregator.
    pub static ref REFRESH_TOTAL: IntCounter =
        register_int_counter!("opalcache_refresh_total", "Total number of cache refresh passes.").unwrap();
    /// The total number of category reloads, labeled by change category.
    pub static ref CATEGORY_RELOADS_TOTAL: IntCounterVec =
        register_int_counter_vec!("opalcache_category_reloads_total", "Total number of category shadow-map reloads, labeled by category.", &["category"]).unwrap();

    // --- Incremental-reload counters ---
    /// The total number of per-entry version checks performed by the stat-compare pass.
    pub static ref STAT_CHECKS_TOTAL: IntCounter =
        register_int_counter!("opalcache_stat_checks_total", "Total number of per-entry stat comparisons.").unwrap();
    /// The total number of entries retained from the previous refresh because their stat was unchanged.
    pub static ref STAT_HITS_TOTAL: IntCounter =
        register_int_counter!("opalcache_stat_hits_total", "Total number of entries carried forward on an unchanged stat.").unwrap();
    /// The total number of full records fetched because they were new, changed, or bucketed.
    pub static ref RECORD_RELOADS_TOTAL: IntCounter =
        register_int_counter!("opalcache_record_reloads_total", "Total number of full-record fetches issued by the stat-compare pass.").unwrap();

    // --- Message counters ---
    /// The total number of relay messages discarded by the relay refinement pass.
    pub static ref RELAY_DISCARDED_TOTAL: IntCounter =
        register_int_counter!("opalcache_relay_discarded_total", "Total number of relay messages discarded against the current-state view.").unwrap();

    // --- Write-back counters ---
    /// The total number of participant-history records written back to the store.
    pub static ref HISTORY_WRITEBACKS_TOTAL: IntCounter =
        register_int_counter!("opalcache_history_writebacks_total", "Total number of participant-history offline write-backs.").unwrap();
    /// The total number of job/workflow context write-throughs.
    pub static ref CONTEXT_WRITEBACKS_TOTAL: IntCounter =
        register_int_counter!("opalcache_context_writebacks_total", "Total number of task context write-throughs.").unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).unwrap()
}
