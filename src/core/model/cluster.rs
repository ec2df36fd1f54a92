// src/core/model/cluster.rs

//! Cluster-scoped entities: the cluster config, constraints, state-model
//! definitions, and the maintenance signal.

use super::typed_record;
use crate::core::record::{TypedRecord, fields};
use std::collections::{HashMap, HashSet};

typed_record! {
    /// The cluster-wide configuration record.
    ClusterConfig
}

impl ClusterConfig {
    pub fn cluster_name(&self) -> &str {
        self.name()
    }

    /// Ideal-state rules, each a named `key=value,key=value` feature string
    /// parsed into a map. Malformed entries are skipped.
    pub fn ideal_state_rules(&self) -> HashMap<String, HashMap<String, String>> {
        let Some(raw) = self.record().map(fields::IDEAL_STATE_RULES) else {
            return HashMap::new();
        };
        raw.iter()
            .map(|(rule, features)| {
                let parsed = features
                    .split(',')
                    .filter_map(|kv| {
                        let (k, v) = kv.split_once('=')?;
                        Some((k.trim().to_string(), v.trim().to_string()))
                    })
                    .collect();
                (rule.clone(), parsed)
            })
            .collect()
    }

    /// Instances disabled cluster-wide (the map-field keys; values carry the
    /// operator's reason and are not interpreted here).
    pub fn disabled_instances(&self) -> HashSet<String> {
        self.record()
            .map(fields::DISABLED_INSTANCES)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

typed_record! {
    /// The allowed states and transitions for a resource type. Referenced by
    /// zero or more ideal states; opaque to the cache beyond its name.
    StateModelDefinition
}

impl StateModelDefinition {
    /// States in priority order, highest first.
    pub fn states_priority_list(&self) -> &[String] {
        self.record().list(fields::STATE_PRIORITY_LIST)
    }

    /// The top state of the model, if the priority list is non-empty.
    pub fn top_state(&self) -> Option<&str> {
        self.states_priority_list().first().map(String::as_str)
    }
}

typed_record! {
    /// A set of cluster constraints of one constraint kind, indexed by the
    /// kind tag. Contents are consumed by pipeline stages, not the cache.
    ClusterConstraints
}

typed_record! {
    /// Presence of this record at its well-known path puts the cluster in
    /// maintenance mode.
    MaintenanceSignal
}

impl MaintenanceSignal {
    pub fn reason(&self) -> Option<&str> {
        self.record().field(fields::REASON)
    }
}
