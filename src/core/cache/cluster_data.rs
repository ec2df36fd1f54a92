// src/core/cache/cluster_data.rs

//! The cluster-data aggregator: owns the sub-caches and the category-level
//! shadow maps, drives selective refresh, computes the derived indices, and
//! publishes the snapshot readers consume.
//!
//! Discipline is single-refresher, many-readers: `refresh` and the shadow
//! setters serialize on one async mutex, watchers mark dirty bits without
//! locking, and readers only ever clone the current snapshot `Arc`.

use super::change::{ChangeCategory, DirtyTable};
use super::current_state::{CurrentStateCache, CurrentStateView, SessionStateMap, StateNameMap};
use super::messages::{InstanceMessagesCache, RelayMessageFilter};
use super::snapshot::ClusterSnapshot;
use super::task_data::TaskDataCache;
use crate::config::{CacheConfig, RefreshConfig};
use crate::core::errors::OpalCacheError;
use crate::core::keys::KeyBuilder;
use crate::core::metrics;
use crate::core::model::{
    ANY_LIVE_INSTANCE, ClusterConfig, ClusterConstraints, ExternalView, IdealMapping, IdealState,
    InstanceConfig, JobConfig, JobContext, LiveInstance, MaintenanceSignal, Message, ONLINE,
    ParticipantHistory, ResourceAssignment, ResourceConfig, StateModelDefinition, WorkflowConfig,
    WorkflowContext,
};
use crate::core::record::{StoreRecord, TypedRecord};
use crate::core::store::MetadataStore;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex as SyncMutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Scratch indices owned by pipeline stages. The cache stores them between
/// refreshes and resets them on request; it never interprets their contents.
/// Single-threaded within a pipeline run and unsynchronized with `refresh`
/// by contract.
#[derive(Debug, Default)]
struct ScratchState {
    target_external_views: DashMap<String, ExternalView>,
    missing_top_states: DashMap<String, HashMap<String, i64>>,
    active_task_counts: DashMap<String, u32>,
}

impl ScratchState {
    fn clear(&self) {
        self.target_external_views.clear();
        self.missing_top_states.clear();
        self.active_task_counts.clear();
    }
}

/// The cross-run memo caches. Entries live until any input that could have
/// invalidated them reloads, then the whole cache is dropped.
#[derive(Debug, Default)]
struct MemoCaches {
    assignments: DashMap<String, Arc<ResourceAssignment>>,
    ideal_mappings: DashMap<String, Arc<IdealMapping>>,
}

impl MemoCaches {
    fn invalidate(&self) {
        self.assignments.clear();
        self.ideal_mappings.clear();
    }
}

/// State only touched under the refresh gate: the shadow maps staged for the
/// next snapshot, the sub-caches, and refresh bookkeeping.
struct CacheInner {
    shadow_ideal_states: HashMap<String, IdealState>,
    shadow_live_instances: HashMap<String, LiveInstance>,
    shadow_instance_configs: HashMap<String, InstanceConfig>,
    shadow_resource_configs: HashMap<String, ResourceConfig>,

    current_states: CurrentStateCache,
    messages: InstanceMessagesCache,
    task_data: TaskDataCache,

    offline_times: HashMap<String, i64>,
    offline_index_stale: bool,
    initialized: bool,
    warned_missing_cluster_config: bool,
}

impl CacheInner {
    fn new() -> Self {
        Self {
            shadow_ideal_states: HashMap::new(),
            shadow_live_instances: HashMap::new(),
            shadow_instance_configs: HashMap::new(),
            shadow_resource_configs: HashMap::new(),
            current_states: CurrentStateCache::new(),
            messages: InstanceMessagesCache::new(),
            task_data: TaskDataCache::new(),
            offline_times: HashMap::new(),
            offline_index_stale: true,
            initialized: false,
            warned_missing_cluster_config: false,
        }
    }
}

/// The snapshot cache at the head of the rebalance pipeline.
pub struct ClusterDataCache {
    cluster_name: String,
    refresh_config: RefreshConfig,
    dirty: DirtyTable,
    inner: Mutex<CacheInner>,
    snapshot: RwLock<Arc<ClusterSnapshot>>,
    injected_messages: DashMap<String, HashMap<String, Message>>,
    scratch: ScratchState,
    memo: MemoCaches,
    task_cache: AtomicBool,
    async_tasks: SyncMutex<Option<Handle>>,
}

impl ClusterDataCache {
    /// A cache for one cluster, with every category dirty so the first
    /// refresh loads the whole world.
    pub fn new(cluster_name: &str) -> Self {
        Self {
            cluster_name: cluster_name.to_string(),
            refresh_config: RefreshConfig::default(),
            dirty: DirtyTable::new(),
            inner: Mutex::new(CacheInner::new()),
            snapshot: RwLock::new(Arc::new(ClusterSnapshot::default())),
            injected_messages: DashMap::new(),
            scratch: ScratchState::default(),
            memo: MemoCaches::default(),
            task_cache: AtomicBool::new(false),
            async_tasks: SyncMutex::new(None),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(&config.cluster_name);
        cache.refresh_config = config.refresh.clone();
        cache.set_task_cache(config.task_cache);
        cache
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    // --- Change notification ---

    /// Marks a category dirty. Safe to call from watcher callbacks without
    /// locking; takes effect at the next refresh.
    pub fn notify_data_change(&self, category: ChangeCategory) {
        self.dirty.mark(category);
    }

    /// Path-carrying variant for watchers that report the changed node.
    pub fn notify_data_change_on_path(&self, category: ChangeCategory, path: &str) {
        debug!("change notification for {category} at '{path}'");
        self.dirty.mark(category);
    }

    /// Marks every category dirty, forcing the next refresh to reload the
    /// whole world. Also the recovery knob after a failed refresh.
    pub async fn require_full_refresh(&self) {
        let _inner = self.inner.lock().await;
        self.dirty.mark_all();
    }

    // --- Refresh ---

    /// One refresh pass. Serialized with itself and the shadow setters; on
    /// error the previously published snapshot stays in place and already
    /// cleared dirty bits stay cleared (call [`Self::require_full_refresh`]
    /// to retry everything).
    pub async fn refresh(&self, store: &dyn MetadataStore) -> Result<(), OpalCacheError> {
        let mut inner = self.inner.lock().await;
        metrics::REFRESH_TOTAL.inc();
        let keys = store.key_builder().clone();

        // Selective reload of the primary categories into the shadow maps.
        // Each reload invalidates the memo caches; a bit re-marked while its
        // reload is in flight stays set for the next refresh.
        let mut live_dirty = false;
        if self.dirty.take(ChangeCategory::IdealState) {
            self.memo.invalidate();
            inner.shadow_ideal_states = load_typed(store, &keys.ideal_states(), "IdealState").await?;
        }
        if self.dirty.take(ChangeCategory::LiveInstance) {
            live_dirty = true;
            self.memo.invalidate();
            inner.shadow_live_instances =
                load_typed(store, &keys.live_instances(), "LiveInstance").await?;
        }
        if self.dirty.take(ChangeCategory::InstanceConfig) {
            self.memo.invalidate();
            inner.shadow_instance_configs =
                load_typed(store, &keys.instance_configs(), "InstanceConfig").await?;
        }
        if self.dirty.take(ChangeCategory::ResourceConfig) {
            self.memo.invalidate();
            inner.shadow_resource_configs =
                load_typed(store, &keys.resource_configs(), "ResourceConfig").await?;
        }

        // Snapshot the shadow maps. Readers of the previous snapshot are
        // untouched; setters that run after this refresh only see the shadows.
        let ideal_states = inner.shadow_ideal_states.clone();
        let live_instances = inner.shadow_live_instances.clone();
        let instance_configs = inner.shadow_instance_configs.clone();
        let resource_configs = inner.shadow_resource_configs.clone();

        if live_dirty || !inner.initialized {
            inner.offline_index_stale = true;
        }
        if inner.offline_index_stale {
            inner.offline_times =
                update_offline_instance_history(store, &keys, &instance_configs, &live_instances)
                    .await?;
            inner.offline_index_stale = false;
        }

        if self.task_cache.load(Ordering::Relaxed) {
            inner.task_data.refresh(store, &resource_configs).await?;
        }

        // The coarse categories are cheap enough to reload every pass.
        let state_model_defs: HashMap<String, StateModelDefinition> =
            load_typed(store, &keys.state_model_defs(), "StateModelDef").await?;
        let constraints: HashMap<String, ClusterConstraints> =
            load_typed(store, &keys.constraints(), "Constraint").await?;
        let cluster_config = store
            .get(&keys.cluster_config())
            .await?
            .map(ClusterConfig::from_record);
        let maintenance_signal = store
            .get(&keys.maintenance_signal())
            .await?
            .map(MaintenanceSignal::from_record);

        // Messages before current states; the relay pass below needs the
        // fresh current-state view and must run after both.
        inner.messages.refresh(store, &live_instances).await?;
        inner
            .current_states
            .refresh(
                store,
                &live_instances,
                self.refresh_config.fetch_warn_threshold,
            )
            .await?;
        let current_states = inner.current_states.view();
        inner
            .messages
            .update_relay_messages(&live_instances, &current_states);

        let ideal_state_rules = match &cluster_config {
            Some(config) => config.ideal_state_rules(),
            None => {
                if !inner.warned_missing_cluster_config {
                    warn!(
                        "cluster config for '{}' is absent, ideal-state rules are empty",
                        self.cluster_name
                    );
                    inner.warned_missing_cluster_config = true;
                }
                HashMap::new()
            }
        };
        let maintenance_mode = maintenance_signal.is_some();
        let (disabled_instances, disabled_partitions) =
            compute_disabled(&instance_configs, cluster_config.as_ref());

        let snapshot = ClusterSnapshot {
            ideal_states,
            live_instances,
            instance_configs,
            resource_configs,
            state_model_defs,
            constraints,
            cluster_config,
            maintenance_signal,
            maintenance_mode,
            ideal_state_rules,
            disabled_instances,
            disabled_partitions,
            instance_offline_times: inner.offline_times.clone(),
            current_states,
            messages: inner.messages.all_messages(),
            job_configs: inner.task_data.job_configs().clone(),
            workflow_configs: inner.task_data.workflow_configs().clone(),
            job_contexts: inner.task_data.job_contexts().clone(),
            workflow_contexts: inner.task_data.workflow_contexts().clone(),
            task_contexts: inner.task_data.contexts().clone(),
        };
        self.injected_messages.clear();
        *self.snapshot.write() = Arc::new(snapshot);
        inner.initialized = true;
        debug!(cluster = %self.cluster_name, "cache refresh complete");
        Ok(())
    }

    // --- Shadow-map seeding ---
    //
    // The setters stage data for the next refresh instead of touching the
    // published snapshot, which stays read-only between refreshes. They give
    // harnesses a deterministic way to seed state without a metadata store
    // behind the next refresh (provided the category's dirty bit is clean).

    pub async fn set_ideal_states(&self, ideal_states: Vec<IdealState>) {
        self.inner.lock().await.shadow_ideal_states = index_by_name(ideal_states);
    }

    pub async fn set_live_instances(&self, live_instances: Vec<LiveInstance>) {
        self.inner.lock().await.shadow_live_instances = index_by_name(live_instances);
    }

    pub async fn set_instance_configs(&self, instance_configs: Vec<InstanceConfig>) {
        let mut inner = self.inner.lock().await;
        inner.shadow_instance_configs = index_by_name(instance_configs);
        inner.offline_index_stale = true;
    }

    pub async fn set_resource_configs(&self, resource_configs: Vec<ResourceConfig>) {
        self.inner.lock().await.shadow_resource_configs = index_by_name(resource_configs);
    }

    /// Swaps the relay predicate applied at the end of every refresh.
    pub async fn set_relay_filter(&self, filter: Arc<dyn RelayMessageFilter>) {
        self.inner.lock().await.messages.set_filter(filter);
    }

    // --- Snapshot readers ---

    fn snap(&self) -> Arc<ClusterSnapshot> {
        self.snapshot.read().clone()
    }

    /// The currently published snapshot. Callers may hold it across
    /// refreshes; it never mutates.
    pub fn snapshot(&self) -> Arc<ClusterSnapshot> {
        self.snap()
    }

    pub fn ideal_states(&self) -> HashMap<String, IdealState> {
        self.snap().ideal_states.clone()
    }

    pub fn ideal_state(&self, resource: &str) -> Option<IdealState> {
        self.snap().ideal_states.get(resource).cloned()
    }

    pub fn live_instances(&self) -> HashMap<String, LiveInstance> {
        self.snap().live_instances.clone()
    }

    /// Every configured instance, live or not.
    pub fn all_instances(&self) -> HashSet<String> {
        self.snap().instance_configs.keys().cloned().collect()
    }

    pub fn enabled_instances(&self) -> HashSet<String> {
        let snap = self.snap();
        snap.instance_configs
            .keys()
            .filter(|name| !snap.disabled_instances.contains(*name))
            .cloned()
            .collect()
    }

    pub fn enabled_live_instances(&self) -> HashSet<String> {
        let snap = self.snap();
        snap.live_instances
            .keys()
            .filter(|name| !snap.disabled_instances.contains(*name))
            .cloned()
            .collect()
    }

    pub fn disabled_instances(&self) -> HashSet<String> {
        self.snap().disabled_instances.clone()
    }

    pub fn instances_with_tag(&self, tag: &str) -> HashSet<String> {
        self.snap()
            .instance_configs
            .iter()
            .filter(|(_, config)| config.contains_tag(tag))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn enabled_live_instances_with_tag(&self, tag: &str) -> HashSet<String> {
        let snap = self.snap();
        snap.live_instances
            .keys()
            .filter(|name| !snap.disabled_instances.contains(*name))
            .filter(|name| {
                snap.instance_configs
                    .get(*name)
                    .is_some_and(|config| config.contains_tag(tag))
            })
            .cloned()
            .collect()
    }

    /// Instances that must not host the given partition: the disabled set
    /// plus any instance that disabled this (resource, partition) pair in
    /// its own config.
    pub fn disabled_instances_for_partition(
        &self,
        resource: &str,
        partition: &str,
    ) -> HashSet<String> {
        let snap = self.snap();
        let mut disabled = snap.disabled_instances.clone();
        if let Some(instances) = snap
            .disabled_partitions
            .get(resource)
            .and_then(|by_partition| by_partition.get(partition))
        {
            disabled.extend(instances.iter().cloned());
        }
        disabled
    }

    /// The replica count of a resource. [`ANY_LIVE_INSTANCE`] maps to the
    /// live-instance count; an absent ideal state or an unparseable field is
    /// reported as -1.
    pub fn replicas(&self, resource: &str) -> i64 {
        let snap = self.snap();
        let Some(ideal) = snap.ideal_states.get(resource) else {
            return -1;
        };
        match ideal.replicas_field() {
            Some(ANY_LIVE_INSTANCE) => snap.live_instances.len() as i64,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                error!("replica count '{raw}' of resource '{resource}' is not a number");
                -1
            }),
            None => -1,
        }
    }

    pub fn constraint(&self, kind: &str) -> Option<ClusterConstraints> {
        self.snap().constraints.get(kind).cloned()
    }

    pub fn state_model_def(&self, model: &str) -> Option<StateModelDefinition> {
        self.snap().state_model_defs.get(model).cloned()
    }

    pub fn state_model_defs(&self) -> HashMap<String, StateModelDefinition> {
        self.snap().state_model_defs.clone()
    }

    pub fn resource_config(&self, resource: &str) -> Option<ResourceConfig> {
        self.snap().resource_configs.get(resource).cloned()
    }

    pub fn resource_configs(&self) -> HashMap<String, ResourceConfig> {
        self.snap().resource_configs.clone()
    }

    pub fn cluster_config(&self) -> Option<ClusterConfig> {
        self.snap().cluster_config.clone()
    }

    pub fn ideal_state_rules(&self) -> HashMap<String, HashMap<String, String>> {
        self.snap().ideal_state_rules.clone()
    }

    pub fn is_maintenance_mode(&self) -> bool {
        self.snap().maintenance_mode
    }

    /// Last-offline millis for configured instances that were not live at
    /// the last refresh that recomputed the index.
    pub fn instance_offline_times(&self) -> HashMap<String, i64> {
        self.snap().instance_offline_times.clone()
    }

    pub fn current_state_view(&self) -> Arc<CurrentStateView> {
        self.snap().current_states.clone()
    }

    /// One instance's session map; empty if it reported nothing.
    pub fn current_states(&self, instance: &str) -> Arc<SessionStateMap> {
        self.snap()
            .current_states
            .get(instance)
            .cloned()
            .unwrap_or_else(|| Arc::new(SessionStateMap::new()))
    }

    /// One (instance, session) state-name map; empty if absent.
    pub fn current_state(&self, instance: &str, session: &str) -> StateNameMap {
        self.snap()
            .current_states
            .get(instance)
            .and_then(|sessions| sessions.get(session))
            .cloned()
            .unwrap_or_default()
    }

    /// Pending messages of one instance, with any injected messages overlaid
    /// until the next refresh.
    pub fn messages(&self, instance: &str) -> HashMap<String, Message> {
        let mut messages = self
            .snap()
            .messages
            .get(instance)
            .cloned()
            .unwrap_or_default();
        if let Some(injected) = self.injected_messages.get(instance) {
            messages.extend(injected.iter().map(|(id, m)| (id.clone(), m.clone())));
        }
        messages
    }

    /// Overlays pre-known messages onto their targets' pending maps until
    /// the next refresh rebuilds them from the store.
    pub fn cache_messages(&self, messages: Vec<Message>) {
        for message in messages {
            let Some(target) = message.target_instance() else {
                warn!("injected message '{}' has no target instance, ignored", message.id());
                continue;
            };
            let target = target.to_string();
            let id = message.id().to_string();
            self.injected_messages
                .entry(target)
                .or_default()
                .insert(id, message);
        }
    }

    // --- Task sub-cache ---

    pub fn is_task_cache(&self) -> bool {
        self.task_cache.load(Ordering::Relaxed)
    }

    /// Enables the task sub-cache for controllers running the task pipeline;
    /// disabled, task refresh is skipped entirely.
    pub fn set_task_cache(&self, enabled: bool) {
        self.task_cache.store(enabled, Ordering::Relaxed);
    }

    pub fn job_configs(&self) -> HashMap<String, JobConfig> {
        self.snap().job_configs.clone()
    }

    pub fn workflow_configs(&self) -> HashMap<String, WorkflowConfig> {
        self.snap().workflow_configs.clone()
    }

    pub fn job_context(&self, resource: &str) -> Option<JobContext> {
        self.snap().job_contexts.get(resource).cloned()
    }

    pub fn workflow_context(&self, resource: &str) -> Option<WorkflowContext> {
        self.snap().workflow_contexts.get(resource).cloned()
    }

    /// The union context index keyed by resource name.
    pub fn task_contexts(&self) -> HashMap<String, StoreRecord> {
        self.snap().task_contexts.clone()
    }

    /// Writes a job context through to the store and republishes the task
    /// maps on success; on failure the cache is untouched.
    pub async fn update_job_context(
        &self,
        store: &dyn MetadataStore,
        resource: &str,
        context: JobContext,
    ) -> Result<(), OpalCacheError> {
        let mut inner = self.inner.lock().await;
        inner
            .task_data
            .update_job_context(store, resource, context)
            .await?;
        self.republish_task_maps(&inner);
        Ok(())
    }

    /// Workflow-context counterpart of [`Self::update_job_context`].
    pub async fn update_workflow_context(
        &self,
        store: &dyn MetadataStore,
        resource: &str,
        context: WorkflowContext,
    ) -> Result<(), OpalCacheError> {
        let mut inner = self.inner.lock().await;
        inner
            .task_data
            .update_workflow_context(store, resource, context)
            .await?;
        self.republish_task_maps(&inner);
        Ok(())
    }

    fn republish_task_maps(&self, inner: &CacheInner) {
        let mut snapshot = (*self.snap()).clone();
        snapshot.job_contexts = inner.task_data.job_contexts().clone();
        snapshot.workflow_contexts = inner.task_data.workflow_contexts().clone();
        snapshot.task_contexts = inner.task_data.contexts().clone();
        *self.snapshot.write() = Arc::new(snapshot);
    }

    // --- Memo caches ---

    pub fn cached_resource_assignment(&self, resource: &str) -> Option<Arc<ResourceAssignment>> {
        self.memo.assignments.get(resource).map(|v| v.clone())
    }

    pub fn cache_resource_assignment(&self, resource: &str, assignment: Arc<ResourceAssignment>) {
        self.memo.assignments.insert(resource.to_string(), assignment);
    }

    pub fn cached_ideal_mapping(&self, resource: &str) -> Option<Arc<IdealMapping>> {
        self.memo.ideal_mappings.get(resource).map(|v| v.clone())
    }

    pub fn cache_ideal_mapping(&self, resource: &str, mapping: Arc<IdealMapping>) {
        self.memo.ideal_mappings.insert(resource.to_string(), mapping);
    }

    /// Drops both memo caches. Also done internally whenever a primary
    /// category reloads.
    pub fn invalidate_cached_mappings(&self) {
        self.memo.invalidate();
    }

    // --- Scratch state owned by pipeline stages ---

    pub fn set_target_external_views(&self, views: HashMap<String, ExternalView>) {
        self.scratch.target_external_views.clear();
        for (resource, view) in views {
            self.scratch.target_external_views.insert(resource, view);
        }
    }

    pub fn target_external_views(&self) -> HashMap<String, ExternalView> {
        self.scratch
            .target_external_views
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn set_missing_top_states(&self, map: HashMap<String, HashMap<String, i64>>) {
        self.scratch.missing_top_states.clear();
        for (resource, partitions) in map {
            self.scratch.missing_top_states.insert(resource, partitions);
        }
    }

    pub fn missing_top_states(&self) -> HashMap<String, HashMap<String, i64>> {
        self.scratch
            .missing_top_states
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn set_participant_active_task_counts(&self, counts: HashMap<String, u32>) {
        self.scratch.active_task_counts.clear();
        for (instance, count) in counts {
            self.scratch.active_task_counts.insert(instance, count);
        }
    }

    pub fn bump_participant_active_task_count(&self, instance: &str) {
        *self
            .scratch
            .active_task_counts
            .entry(instance.to_string())
            .or_insert(0) += 1;
    }

    pub fn participant_active_task_counts(&self) -> HashMap<String, u32> {
        self.scratch
            .active_task_counts
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    /// Drops every scratch index.
    pub fn clear_monitoring_records(&self) {
        self.scratch.clear();
    }

    // --- Executor handle ---

    /// Stores the executor for asynchronous controller tasks. The cache
    /// never spawns on it; it only hands it back out.
    pub fn set_async_tasks_handle(&self, handle: Handle) {
        *self.async_tasks.lock() = Some(handle);
    }

    pub fn async_tasks_handle(&self) -> Option<Handle> {
        self.async_tasks.lock().clone()
    }
}

/// Fetches one category's children as typed records, keyed by name.
async fn load_typed<T: TypedRecord>(
    store: &dyn MetadataStore,
    parent: &crate::core::keys::PropertyKey,
    label: &str,
) -> Result<HashMap<String, T>, OpalCacheError> {
    metrics::CATEGORY_RELOADS_TOTAL.with_label_values(&[label]).inc();
    let values = store.child_values(parent, false).await?;
    Ok(values
        .into_iter()
        .map(|(name, record)| (name, T::from_record(record)))
        .collect())
}

fn index_by_name<T: TypedRecord>(values: Vec<T>) -> HashMap<String, T> {
    values
        .into_iter()
        .map(|value| (value.name().to_string(), value))
        .collect()
}

/// Recomputes the offline-time index for configured instances that are not
/// live, transitioning still-online histories to offline and writing them
/// back. A rejected or failed write-back is logged and the instance's
/// timestamp left unrecorded for this refresh.
async fn update_offline_instance_history(
    store: &dyn MetadataStore,
    keys: &KeyBuilder,
    instance_configs: &HashMap<String, InstanceConfig>,
    live_instances: &HashMap<String, LiveInstance>,
) -> Result<HashMap<String, i64>, OpalCacheError> {
    let mut offline_times = HashMap::new();
    for instance in instance_configs.keys() {
        if live_instances.contains_key(instance) {
            continue;
        }
        let key = keys.participant_history(instance);
        let mut history = match store.get(&key).await? {
            Some(record) => ParticipantHistory::from_record(record),
            None => ParticipantHistory::new(instance),
        };
        if history.last_offline_time() == ONLINE {
            let now = Utc::now().timestamp_millis();
            history.report_offline(now);
            match store.set(&key, history.record().clone()).await {
                Ok(true) => {
                    metrics::HISTORY_WRITEBACKS_TOTAL.inc();
                    offline_times.insert(instance.clone(), now);
                }
                Ok(false) => {
                    error!("history write-back for '{instance}' rejected, offline time dropped");
                }
                Err(e) => {
                    error!("history write-back for '{instance}' failed: {e}");
                }
            }
        } else {
            offline_times.insert(instance.clone(), history.last_offline_time());
        }
    }
    Ok(offline_times)
}

/// Scans the instance configs for the disabled set and the per-partition
/// disabled map, then unions in the cluster-config disabled list.
fn compute_disabled(
    instance_configs: &HashMap<String, InstanceConfig>,
    cluster_config: Option<&ClusterConfig>,
) -> (
    HashSet<String>,
    HashMap<String, HashMap<String, HashSet<String>>>,
) {
    let mut disabled = HashSet::new();
    let mut per_partition: HashMap<String, HashMap<String, HashSet<String>>> = HashMap::new();
    for (name, config) in instance_configs {
        if !config.instance_enabled() {
            disabled.insert(name.clone());
        }
        for (resource, partitions) in config.disabled_partitions() {
            let by_partition = per_partition.entry(resource).or_default();
            for partition in partitions {
                by_partition
                    .entry(partition)
                    .or_default()
                    .insert(name.clone());
            }
        }
    }
    if let Some(config) = cluster_config {
        disabled.extend(config.disabled_instances());
    }
    (disabled, per_partition)
}
