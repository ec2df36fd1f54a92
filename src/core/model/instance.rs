// src/core/model/instance.rs

//! Participant-side entities: live-instance ephemerals, instance configs,
//! and the write-back participant history.

use super::typed_record;
use crate::core::record::{StoreRecord, TypedRecord, fields};
use std::collections::{HashMap, HashSet};

/// Sentinel value of `LAST_OFFLINE_TIME` while a participant is online.
pub const ONLINE: i64 = -1;

typed_record! {
    /// The ephemeral record a participant publishes under its metadata-store
    /// session. Its presence means the instance is currently online.
    LiveInstance
}

impl LiveInstance {
    /// The ephemeral session this record was published under. Changes on
    /// every reconnect; a well-formed record never carries an empty session.
    pub fn session_id(&self) -> &str {
        self.record().field(fields::SESSION_ID).unwrap_or_default()
    }
}

typed_record! {
    /// The durable per-instance configuration. Every live instance has one;
    /// the reverse does not hold.
    InstanceConfig
}

impl InstanceConfig {
    /// Whether the operator left this instance enabled. An absent flag means enabled.
    pub fn instance_enabled(&self) -> bool {
        self.record().bool_field(fields::ENABLED).unwrap_or(true)
    }

    /// Partitions explicitly disabled on this instance, per resource.
    /// Stored as a map field of comma-separated partition names.
    pub fn disabled_partitions(&self) -> HashMap<String, HashSet<String>> {
        let Some(raw) = self.record().map(fields::DISABLED_PARTITIONS) else {
            return HashMap::new();
        };
        raw.iter()
            .map(|(resource, joined)| {
                let partitions = joined
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
                (resource.clone(), partitions)
            })
            .collect()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.record().list(fields::TAGS).iter().any(|t| t == tag)
    }
}

typed_record! {
    /// The per-participant offline/online history, persisted back to the
    /// metadata store when the cache observes an instance go offline.
    ParticipantHistory
}

impl ParticipantHistory {
    /// A fresh history for an instance the store has never seen go offline.
    pub fn new(instance: &str) -> Self {
        let mut record = StoreRecord::new(instance);
        record.set_field(fields::LAST_OFFLINE_TIME, ONLINE.to_string());
        Self::from_record(record)
    }

    /// The last observed offline timestamp in wall-clock millis, or
    /// [`ONLINE`] while the participant is up.
    pub fn last_offline_time(&self) -> i64 {
        self.record()
            .int_field(fields::LAST_OFFLINE_TIME)
            .unwrap_or(ONLINE)
    }

    /// Records the offline transition at `now` (wall-clock millis) and
    /// appends it to the offline history list. Transitions are monotonic:
    /// a record already offline keeps its earlier timestamp.
    pub fn report_offline(&mut self, now: i64) {
        if self.last_offline_time() != ONLINE {
            return;
        }
        self.record.set_field(fields::LAST_OFFLINE_TIME, now.to_string());
        self.record.push_list(fields::OFFLINE_HISTORY, now.to_string());
    }
}
