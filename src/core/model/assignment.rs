// src/core/model/assignment.rs

//! Value types of the cross-run memo caches. Both are produced by the
//! rebalance pipeline; the cache stores them and ties their lifetime to
//! input invalidations, nothing more.

use std::collections::HashMap;

/// A computed placement of one resource: partition -> instance -> state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAssignment {
    resource: String,
    replica_maps: HashMap<String, HashMap<String, String>>,
}

impl ResourceAssignment {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            replica_maps: HashMap::new(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn set_replica_map(&mut self, partition: impl Into<String>, map: HashMap<String, String>) {
        self.replica_maps.insert(partition.into(), map);
    }

    pub fn replica_map(&self, partition: &str) -> Option<&HashMap<String, String>> {
        self.replica_maps.get(partition)
    }

    pub fn partitions(&self) -> impl Iterator<Item = &str> {
        self.replica_maps.keys().map(String::as_str)
    }
}

/// A computed ideal mapping of one resource: partition -> instance
/// preference list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdealMapping {
    preference_lists: HashMap<String, Vec<String>>,
}

impl IdealMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_preference_list(&mut self, partition: impl Into<String>, list: Vec<String>) {
        self.preference_lists.insert(partition.into(), list);
    }

    pub fn preference_list(&self, partition: &str) -> Option<&[String]> {
        self.preference_lists.get(partition).map(Vec::as_slice)
    }
}
