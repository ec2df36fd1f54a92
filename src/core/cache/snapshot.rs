// src/core/cache/snapshot.rs

//! The immutable view one refresh publishes. Readers clone the `Arc` and
//! iterate without locking; the aggregator swaps in a freshly built value at
//! the end of every successful refresh.

use super::current_state::CurrentStateView;
use crate::core::model::{
    ClusterConfig, ClusterConstraints, IdealState, InstanceConfig, JobConfig, JobContext,
    LiveInstance, MaintenanceSignal, Message, ResourceConfig, StateModelDefinition, WorkflowConfig,
    WorkflowContext,
};
use crate::core::record::StoreRecord;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Everything a pipeline iteration reads, consistent as of one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSnapshot {
    pub ideal_states: HashMap<String, IdealState>,
    pub live_instances: HashMap<String, LiveInstance>,
    pub instance_configs: HashMap<String, InstanceConfig>,
    pub resource_configs: HashMap<String, ResourceConfig>,

    pub state_model_defs: HashMap<String, StateModelDefinition>,
    pub constraints: HashMap<String, ClusterConstraints>,
    pub cluster_config: Option<ClusterConfig>,
    pub maintenance_signal: Option<MaintenanceSignal>,
    pub maintenance_mode: bool,

    /// Rule name -> parsed feature map, from the cluster config (empty when
    /// the config record is absent).
    pub ideal_state_rules: HashMap<String, HashMap<String, String>>,
    /// Instances disabled by their own config or by the cluster config.
    pub disabled_instances: HashSet<String>,
    /// resource -> partition -> instances disabled for that partition.
    pub disabled_partitions: HashMap<String, HashMap<String, HashSet<String>>>,
    /// Last-offline millis for configured instances that are not live.
    pub instance_offline_times: HashMap<String, i64>,

    pub current_states: Arc<CurrentStateView>,
    pub messages: HashMap<String, HashMap<String, Message>>,

    pub job_configs: HashMap<String, JobConfig>,
    pub workflow_configs: HashMap<String, WorkflowConfig>,
    pub job_contexts: HashMap<String, JobContext>,
    pub workflow_contexts: HashMap<String, WorkflowContext>,
    pub task_contexts: HashMap<String, StoreRecord>,
}
