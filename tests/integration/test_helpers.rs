// tests/integration/test_helpers.rs

//! Test helpers and utilities for the OpalCache test suite.

#![allow(dead_code)]

#[path = "fixtures.rs"]
pub mod fixtures;

use opalcache::ClusterDataCache;
use opalcache::core::errors::OpalCacheError;
use opalcache::core::model::{
    ClusterConfig, ClusterConstraints, CurrentState, IdealState, InstanceConfig, Message,
    ParticipantHistory, ResourceConfig, StateModelDefinition,
};
use opalcache::core::record::{StoreRecord, TypedRecord};
use opalcache::core::store::{MemoryStore, MetadataStore};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const CLUSTER: &str = "test-cluster";

/// TestCluster provides a complete test environment: an in-memory metadata
/// store and a cache pointed at it.
pub struct TestCluster {
    pub store: MemoryStore,
    pub cache: ClusterDataCache,
}

impl TestCluster {
    pub async fn new() -> Self {
        // Set up minimal tracing for tests (ignore error if already initialized).
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("warn"))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();

        Self {
            store: MemoryStore::new(CLUSTER),
            cache: ClusterDataCache::new(CLUSTER),
        }
    }

    /// Refreshes the cache against the store, panicking on failure.
    pub async fn refresh(&self) {
        self.cache
            .refresh(&self.store)
            .await
            .expect("cache refresh failed");
    }

    pub async fn try_refresh(&self) -> Result<(), OpalCacheError> {
        self.cache.refresh(&self.store).await
    }

    // --- Store seeding ---

    pub async fn seed_live_instance(&self, name: &str, session: &str) {
        let key = self.store.key_builder().live_instance(name);
        let record = fixtures::live_instance(name, session).into_record();
        self.store.set(&key, record).await.unwrap();
    }

    pub async fn remove_live_instance(&self, name: &str) {
        let key = self.store.key_builder().live_instance(name);
        self.store.remove(&key);
    }

    pub async fn seed_instance_config(&self, config: InstanceConfig) {
        let key = self.store.key_builder().instance_config(config.name());
        self.store.set(&key, config.into_record()).await.unwrap();
    }

    pub async fn seed_ideal_state(&self, ideal: IdealState) {
        let key = self.store.key_builder().ideal_state(ideal.name());
        self.store.set(&key, ideal.into_record()).await.unwrap();
    }

    pub async fn seed_resource_config(&self, config: ResourceConfig) {
        let key = self.store.key_builder().resource_config(config.name());
        self.store.set(&key, config.into_record()).await.unwrap();
    }

    pub async fn seed_current_state(&self, instance: &str, state: CurrentState) {
        let key = self
            .store
            .key_builder()
            .current_state(instance, state.session_id(), state.name());
        self.store.set(&key, state.into_record()).await.unwrap();
    }

    pub async fn seed_message(&self, message: Message) {
        let target = message
            .target_instance()
            .expect("test message needs a target")
            .to_string();
        let key = self.store.key_builder().message(&target, message.id());
        self.store.set(&key, message.into_record()).await.unwrap();
    }

    pub async fn seed_cluster_config(&self, config: ClusterConfig) {
        let key = self.store.key_builder().cluster_config();
        self.store.set(&key, config.into_record()).await.unwrap();
    }

    pub async fn seed_maintenance(&self, reason: &str) {
        let key = self.store.key_builder().maintenance_signal();
        let record = fixtures::maintenance_signal(reason).into_record();
        self.store.set(&key, record).await.unwrap();
    }

    pub async fn clear_maintenance(&self) {
        let key = self.store.key_builder().maintenance_signal();
        self.store.remove(&key);
    }

    pub async fn seed_history(&self, history: ParticipantHistory) {
        let key = self.store.key_builder().participant_history(history.name());
        self.store.set(&key, history.into_record()).await.unwrap();
    }

    pub async fn seed_state_model(&self, model: StateModelDefinition) {
        let key = self.store.key_builder().state_model_def(model.name());
        self.store.set(&key, model.into_record()).await.unwrap();
    }

    pub async fn seed_constraint(&self, constraints: ClusterConstraints) {
        let key = self.store.key_builder().constraint(constraints.name());
        self.store.set(&key, constraints.into_record()).await.unwrap();
    }

    pub async fn seed_task_context(&self, resource: &str, record: StoreRecord) {
        let key = self.store.key_builder().task_context(resource);
        self.store.set(&key, record).await.unwrap();
    }
}
