// tests/integration/fixtures.rs

//! Record builders shared across the test suite.

#![allow(dead_code)]

use opalcache::core::model::{
    ClusterConfig, ClusterConstraints, CurrentState, IdealState, InstanceConfig, JobContext,
    LiveInstance, MaintenanceSignal, Message, ParticipantHistory, ResourceConfig,
    StateModelDefinition, WorkflowContext,
};
use opalcache::core::record::{StoreRecord, TypedRecord, fields};

pub fn live_instance(name: &str, session: &str) -> LiveInstance {
    let mut record = StoreRecord::new(name);
    record.set_field(fields::SESSION_ID, session);
    LiveInstance::from_record(record)
}

pub fn instance_config(name: &str, enabled: bool) -> InstanceConfig {
    let mut record = StoreRecord::new(name);
    record.set_field(fields::ENABLED, enabled.to_string());
    InstanceConfig::from_record(record)
}

pub fn instance_config_with_tags(name: &str, enabled: bool, tags: &[&str]) -> InstanceConfig {
    let mut record = instance_config(name, enabled).into_record();
    for tag in tags {
        record.push_list(fields::TAGS, *tag);
    }
    InstanceConfig::from_record(record)
}

pub fn instance_config_with_disabled_partitions(
    name: &str,
    resource: &str,
    partitions: &[&str],
) -> InstanceConfig {
    let mut record = instance_config(name, true).into_record();
    record.set_map_entry(fields::DISABLED_PARTITIONS, resource, partitions.join(","));
    InstanceConfig::from_record(record)
}

pub fn ideal_state(resource: &str, replicas: &str) -> IdealState {
    let mut record = StoreRecord::new(resource);
    record.set_field(fields::REPLICAS, replicas);
    record.set_field(fields::STATE_MODEL_DEF_REF, "LeaderStandby");
    IdealState::from_record(record)
}

pub fn resource_config(resource: &str) -> ResourceConfig {
    ResourceConfig::from_record(StoreRecord::new(resource))
}

pub fn task_resource_config(resource: &str, task_type: &str) -> ResourceConfig {
    let mut record = StoreRecord::new(resource);
    record.set_field(fields::TASK_TYPE, task_type);
    ResourceConfig::from_record(record)
}

/// A current-state report for one resource: the record id is the resource
/// name, and each partition maps to its reported state.
pub fn current_state(
    resource: &str,
    session: &str,
    partition_states: &[(&str, &str)],
) -> CurrentState {
    let mut record = StoreRecord::new(resource);
    record.set_field(fields::SESSION_ID, session);
    for (partition, state) in partition_states {
        record.set_map_entry(*partition, fields::CURRENT_STATE, *state);
    }
    CurrentState::from_record(record)
}

pub fn bucketed_current_state(
    resource: &str,
    session: &str,
    bucket_size: i64,
    partition_states: &[(&str, &str)],
) -> CurrentState {
    let mut record = current_state(resource, session, partition_states).into_record();
    record.set_field(fields::BUCKET_SIZE, bucket_size.to_string());
    CurrentState::from_record(record)
}

pub fn message(id: &str, target: &str, target_session: &str) -> Message {
    let mut record = StoreRecord::new(id);
    record.set_field(fields::MSG_TYPE, "STATE_TRANSITION");
    record.set_field(fields::TGT_NAME, target);
    record.set_field(fields::TGT_SESSION_ID, target_session);
    Message::from_record(record)
}

pub fn relay_message(
    id: &str,
    target: &str,
    target_session: &str,
    resource: &str,
    partition: &str,
    from_state: &str,
    to_state: &str,
) -> Message {
    let mut record = message(id, target, target_session).into_record();
    record.set_field(fields::MSG_TYPE, "RELAY");
    record.set_field(fields::RESOURCE_NAME, resource);
    record.set_field(fields::PARTITION_NAME, partition);
    record.set_field(fields::FROM_STATE, from_state);
    record.set_field(fields::TO_STATE, to_state);
    record.set_field(fields::RELAY_PARTICIPANT, "relay-host");
    Message::from_record(record)
}

pub fn cluster_config(
    cluster: &str,
    disabled_instances: &[&str],
    rules: &[(&str, &str)],
) -> ClusterConfig {
    let mut record = StoreRecord::new(cluster);
    for instance in disabled_instances {
        record.set_map_entry(fields::DISABLED_INSTANCES, *instance, "operator");
    }
    for (rule, features) in rules {
        record.set_map_entry(fields::IDEAL_STATE_RULES, *rule, *features);
    }
    ClusterConfig::from_record(record)
}

pub fn maintenance_signal(reason: &str) -> MaintenanceSignal {
    let mut record = StoreRecord::new("maintenance");
    record.set_field(fields::REASON, reason);
    MaintenanceSignal::from_record(record)
}

pub fn participant_history(instance: &str, last_offline: i64) -> ParticipantHistory {
    let mut record = StoreRecord::new(instance);
    record.set_field(fields::LAST_OFFLINE_TIME, last_offline.to_string());
    ParticipantHistory::from_record(record)
}

pub fn state_model(name: &str, states: &[&str]) -> StateModelDefinition {
    let mut record = StoreRecord::new(name);
    for state in states {
        record.push_list(fields::STATE_PRIORITY_LIST, *state);
    }
    StateModelDefinition::from_record(record)
}

pub fn constraint_set(kind: &str) -> ClusterConstraints {
    ClusterConstraints::from_record(StoreRecord::new(kind))
}

pub fn job_context(resource: &str, info: &str) -> JobContext {
    let mut record = StoreRecord::new(resource);
    record.set_field("INFO", info);
    JobContext::from_record(record)
}

pub fn workflow_context(resource: &str, info: &str) -> WorkflowContext {
    let mut record = StoreRecord::new(resource);
    record.set_field("INFO", info);
    WorkflowContext::from_record(record)
}
