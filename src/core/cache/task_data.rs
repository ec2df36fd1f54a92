// src/core/cache/task_data.rs

//! The task-data sub-cache: job/workflow views of the resource configs, plus
//! their runtime contexts with write-through updates.

use crate::core::errors::OpalCacheError;
use crate::core::metrics;
use crate::core::model::{
    JobConfig, JobContext, ResourceConfig, TaskType, WorkflowConfig, WorkflowContext,
};
use crate::core::record::{StoreRecord, TypedRecord};
use crate::core::store::MetadataStore;
use std::collections::HashMap;
use tracing::debug;

/// Typed task views over the resource-config map, and the context records
/// fetched on demand and cached across refreshes.
#[derive(Debug, Default)]
pub struct TaskDataCache {
    job_configs: HashMap<String, JobConfig>,
    workflow_configs: HashMap<String, WorkflowConfig>,
    job_contexts: HashMap<String, JobContext>,
    workflow_contexts: HashMap<String, WorkflowContext>,
    contexts: HashMap<String, StoreRecord>,
}

impl TaskDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derives the typed config views and lazily fetches contexts for
    /// task resources that have none cached yet. Cached contexts are carried
    /// forward even when their config vanished, since contexts may briefly
    /// outlive configs.
    pub async fn refresh(
        &mut self,
        store: &dyn MetadataStore,
        resource_configs: &HashMap<String, ResourceConfig>,
    ) -> Result<(), OpalCacheError> {
        let keys = store.key_builder();
        let mut job_configs = HashMap::new();
        let mut workflow_configs = HashMap::new();

        for (name, config) in resource_configs {
            let Some(task_type) = config.task_type() else {
                continue;
            };
            match task_type {
                TaskType::Job => {
                    job_configs.insert(name.clone(), JobConfig::from_record(config.record().clone()));
                }
                TaskType::Workflow => {
                    workflow_configs
                        .insert(name.clone(), WorkflowConfig::from_record(config.record().clone()));
                }
            }
            if self.contexts.contains_key(name) {
                continue;
            }
            let Some(record) = store.get(&keys.task_context(name)).await? else {
                continue;
            };
            match task_type {
                TaskType::Job => {
                    self.job_contexts
                        .insert(name.clone(), JobContext::from_record(record.clone()));
                }
                TaskType::Workflow => {
                    self.workflow_contexts
                        .insert(name.clone(), WorkflowContext::from_record(record.clone()));
                }
            }
            self.contexts.insert(name.clone(), record);
        }

        self.job_configs = job_configs;
        self.workflow_configs = workflow_configs;
        debug!(
            jobs = self.job_configs.len(),
            workflows = self.workflow_configs.len(),
            contexts = self.contexts.len(),
            "task-data refresh complete"
        );
        Ok(())
    }

    /// Writes a job context through to the store, updating the in-memory
    /// cache only once the write is accepted.
    pub async fn update_job_context(
        &mut self,
        store: &dyn MetadataStore,
        resource: &str,
        context: JobContext,
    ) -> Result<(), OpalCacheError> {
        let key = store.key_builder().task_context(resource);
        if !store.set(&key, context.record().clone()).await? {
            return Err(OpalCacheError::WriteRejected(key.path()));
        }
        metrics::CONTEXT_WRITEBACKS_TOTAL.inc();
        self.contexts
            .insert(resource.to_string(), context.record().clone());
        self.job_contexts.insert(resource.to_string(), context);
        Ok(())
    }

    /// Writes a workflow context through to the store, updating the
    /// in-memory cache only once the write is accepted.
    pub async fn update_workflow_context(
        &mut self,
        store: &dyn MetadataStore,
        resource: &str,
        context: WorkflowContext,
    ) -> Result<(), OpalCacheError> {
        let key = store.key_builder().task_context(resource);
        if !store.set(&key, context.record().clone()).await? {
            return Err(OpalCacheError::WriteRejected(key.path()));
        }
        metrics::CONTEXT_WRITEBACKS_TOTAL.inc();
        self.contexts
            .insert(resource.to_string(), context.record().clone());
        self.workflow_contexts.insert(resource.to_string(), context);
        Ok(())
    }

    pub fn job_configs(&self) -> &HashMap<String, JobConfig> {
        &self.job_configs
    }

    pub fn workflow_configs(&self) -> &HashMap<String, WorkflowConfig> {
        &self.workflow_configs
    }

    pub fn job_contexts(&self) -> &HashMap<String, JobContext> {
        &self.job_contexts
    }

    pub fn workflow_contexts(&self) -> &HashMap<String, WorkflowContext> {
        &self.workflow_contexts
    }

    /// The union context index keyed by resource name.
    pub fn contexts(&self) -> &HashMap<String, StoreRecord> {
        &self.contexts
    }
}
