// src/core/cache/messages.rs

//! The instance-messages sub-cache and the relay refinement applied against
//! the current-state view.

use super::current_state::CurrentStateView;
use super::stat_compare::reload_stat_compared;
use crate::core::errors::OpalCacheError;
use crate::core::keys::{PropertyKey, PropertyKind};
use crate::core::metrics;
use crate::core::model::{LiveInstance, Message};
use crate::core::store::MetadataStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Decides whether a pending message survives the relay refinement pass.
///
/// The predicate is pluggable so the sub-cache stays agnostic to state-model
/// specifics; the pipeline installs whatever filtering rule it expects.
pub trait RelayMessageFilter: Send + Sync {
    fn should_retain(
        &self,
        message: &Message,
        live_instances: &HashMap<String, LiveInstance>,
        view: &CurrentStateView,
    ) -> bool;
}

/// The stock rule: relay hand-offs are validated against the target's
/// current state; everything else passes untouched.
///
/// A relay message is discarded when its target is gone or reconnected under
/// a new session, when the partition already reached the target state, or
/// when the from-state precondition no longer matches the reported state.
#[derive(Debug, Default)]
pub struct DefaultRelayFilter;

impl RelayMessageFilter for DefaultRelayFilter {
    fn should_retain(
        &self,
        message: &Message,
        live_instances: &HashMap<String, LiveInstance>,
        view: &CurrentStateView,
    ) -> bool {
        if !message.is_relay() {
            return true;
        }
        let Some(target) = message.target_instance() else {
            return false;
        };
        let Some(live) = live_instances.get(target) else {
            return false;
        };
        if message.target_session() != Some(live.session_id()) {
            return false;
        }

        let reported = message.resource().and_then(|resource| {
            view.get(target)
                .and_then(|sessions| sessions.get(live.session_id()))
                .and_then(|states| states.get(resource))
        });
        let partition_state = match (reported, message.partition()) {
            (Some(current), Some(partition)) => current.partition_state(partition),
            // Nothing reported yet for this resource: the hand-off is still valid.
            _ => None,
        };
        if partition_state.is_some() && partition_state == message.to_state() {
            return false;
        }
        if partition_state.is_some() && partition_state != message.from_state() {
            return false;
        }
        true
    }
}

/// Pending messages per instance, refreshed with the same stat-compare
/// policy as the current-state sub-cache.
pub struct InstanceMessagesCache {
    entries: HashMap<PropertyKey, Message>,
    by_instance: HashMap<String, HashMap<String, Message>>,
    filter: Arc<dyn RelayMessageFilter>,
}

impl InstanceMessagesCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            by_instance: HashMap::new(),
            filter: Arc::new(DefaultRelayFilter),
        }
    }

    /// Swaps in a different relay predicate for subsequent refinement passes.
    pub fn set_filter(&mut self, filter: Arc<dyn RelayMessageFilter>) {
        self.filter = filter;
    }

    /// Re-lists and incrementally reloads every live instance's message queue.
    pub async fn refresh(
        &mut self,
        store: &dyn MetadataStore,
        live_instances: &HashMap<String, LiveInstance>,
    ) -> Result<(), OpalCacheError> {
        let keys = store.key_builder();
        let mut expected = Vec::new();
        for name in live_instances.keys() {
            let parent = keys.messages(name);
            for child in store.children(&parent).await? {
                expected.push(keys.message(name, &child));
            }
        }

        let (next, _) = reload_stat_compared(store, expected, &self.entries).await?;
        self.entries = next;

        let mut by_instance: HashMap<String, HashMap<String, Message>> = HashMap::new();
        for (key, message) in &self.entries {
            let PropertyKind::Message { instance, id } = &key.kind else {
                continue;
            };
            by_instance
                .entry(instance.clone())
                .or_default()
                .insert(id.clone(), message.clone());
        }
        self.by_instance = by_instance;
        Ok(())
    }

    /// The relay refinement pass. Runs strictly after the current-state
    /// refresh of the same cycle and drops messages the filter rejects.
    pub fn update_relay_messages(
        &mut self,
        live_instances: &HashMap<String, LiveInstance>,
        view: &CurrentStateView,
    ) {
        let filter = self.filter.clone();
        let mut discarded = 0u64;
        for pending in self.by_instance.values_mut() {
            pending.retain(|id, message| {
                let retain = filter.should_retain(message, live_instances, view);
                if !retain {
                    discarded += 1;
                    debug!("relay message '{id}' no longer valid against current state, dropped");
                }
                retain
            });
        }
        if discarded > 0 {
            metrics::RELAY_DISCARDED_TOTAL.inc_by(discarded);
        }
    }

    /// One instance's pending messages by message id; empty if none.
    pub fn messages_for_instance(&self, instance: &str) -> HashMap<String, Message> {
        self.by_instance.get(instance).cloned().unwrap_or_default()
    }

    /// The whole per-instance map, cloned for snapshot publication.
    pub fn all_messages(&self) -> HashMap<String, HashMap<String, Message>> {
        self.by_instance.clone()
    }
}

impl Default for InstanceMessagesCache {
    fn default() -> Self {
        Self::new()
    }
}
