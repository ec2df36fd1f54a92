// src/core/model/resource.rs

//! Resource-side entities: ideal states, resource configs, reported current
//! states, and computed external views.

use super::typed_record;
use crate::core::record::{TypedRecord, fields};
use std::collections::HashMap;

/// Replica-count sentinel meaning "one replica on every live instance".
pub const ANY_LIVE_INSTANCE: &str = "ANY_LIVE_INSTANCE";

typed_record! {
    /// Declarative desired placement of a resource's partitions. Immutable
    /// within a refresh.
    IdealState
}

impl IdealState {
    /// The raw replica-count field. May hold a number or [`ANY_LIVE_INSTANCE`].
    pub fn replicas_field(&self) -> Option<&str> {
        self.record().field(fields::REPLICAS)
    }

    pub fn state_model_def_ref(&self) -> Option<&str> {
        self.record().field(fields::STATE_MODEL_DEF_REF)
    }

    /// The declared partition names (the record's map-field keys).
    pub fn partitions(&self) -> impl Iterator<Item = &str> {
        self.record().maps.keys().map(String::as_str)
    }

    /// The declared preference map of one partition, if any.
    pub fn preference_map(&self, partition: &str) -> Option<&HashMap<String, String>> {
        self.record().map(partition)
    }
}

/// Marker on a resource config claiming it for the task subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Job,
    Workflow,
}

typed_record! {
    /// Optional per-resource configuration.
    ResourceConfig
}

impl ResourceConfig {
    /// The task-subsystem marker, if this resource belongs to it.
    pub fn task_type(&self) -> Option<TaskType> {
        match self.record().field(fields::TASK_TYPE) {
            Some("JOB") => Some(TaskType::Job),
            Some("WORKFLOW") => Some(TaskType::Workflow),
            _ => None,
        }
    }
}

typed_record! {
    /// A participant's reported state for the partitions of one resource,
    /// scoped by session. `bucket_size() == 0` makes it eligible for
    /// stat-based reload skipping.
    CurrentState
}

impl CurrentState {
    pub fn session_id(&self) -> &str {
        self.record().field(fields::SESSION_ID).unwrap_or_default()
    }

    /// The reported state of one partition, if the participant reported it.
    pub fn partition_state(&self, partition: &str) -> Option<&str> {
        self.record()
            .map(partition)
            .and_then(|m| m.get(fields::CURRENT_STATE))
            .map(String::as_str)
    }
}

typed_record! {
    /// A computed external view of one resource (partition -> instance ->
    /// state), produced by pipeline stages and only stored here.
    ExternalView
}

impl ExternalView {
    pub fn state_map(&self, partition: &str) -> Option<&HashMap<String, String>> {
        self.record().map(partition)
    }
}
