// src/core/cache/current_state.rs

//! The current-state sub-cache: per-instance, per-session, per-state-name
//! records with version-compared incremental reload.

use super::stat_compare::reload_stat_compared;
use crate::core::errors::OpalCacheError;
use crate::core::keys::{PropertyKey, PropertyKind};
use crate::core::model::{CurrentState, LiveInstance};
use crate::core::store::MetadataStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// state-name -> current-state record.
pub type StateNameMap = HashMap<String, CurrentState>;
/// session -> state-name -> record.
pub type SessionStateMap = HashMap<String, StateNameMap>;
/// instance -> session -> state-name -> record. Each instance sub-map is
/// individually frozen so readers can hold one across a later refresh.
pub type CurrentStateView = HashMap<String, Arc<SessionStateMap>>;

/// Largest and most volatile sub-cache: the state reports each live
/// participant publishes under its ephemeral session.
///
/// Holds a flat entry store keyed by property key, and the three-level view
/// derived from it. After a refresh the view is immutable and safely
/// shareable until the next refresh begins.
#[derive(Debug, Default)]
pub struct CurrentStateCache {
    entries: HashMap<PropertyKey, CurrentState>,
    view: Arc<CurrentStateView>,
}

impl CurrentStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the entry store and view for the given live instances.
    ///
    /// Expected keys are enumerated from each live instance's current
    /// session, so entries of dead sessions fall out implicitly: only
    /// expected keys are carried forward. `fetch_warn_threshold` bounds the
    /// full-record fetches a pass may issue before it is flagged in the
    /// logs; `0` disables the check.
    pub async fn refresh(
        &mut self,
        store: &dyn MetadataStore,
        live_instances: &HashMap<String, LiveInstance>,
        fetch_warn_threshold: usize,
    ) -> Result<(), OpalCacheError> {
        let keys = store.key_builder();
        let mut expected = Vec::new();
        for (name, live) in live_instances {
            let session = live.session_id();
            if session.is_empty() {
                warn!("live instance '{name}' carries an empty session id, skipping");
                continue;
            }
            let parent = keys.current_states(name, session);
            for child in store.children(&parent).await? {
                expected.push(keys.current_state(name, session, &child));
            }
        }

        let (next, stats) = reload_stat_compared(store, expected, &self.entries).await?;
        if fetch_warn_threshold > 0 && stats.fetched > fetch_warn_threshold {
            warn!(
                "current-state refresh fetched {} full records, above the threshold of {}",
                stats.fetched, fetch_warn_threshold
            );
        }
        self.entries = next;
        self.rebuild_view();
        debug!(
            instances = live_instances.len(),
            entries = self.entries.len(),
            fetched = stats.fetched,
            "current-state refresh complete"
        );
        Ok(())
    }

    fn rebuild_view(&mut self) {
        let mut staging: HashMap<String, SessionStateMap> = HashMap::new();
        for (key, record) in &self.entries {
            let PropertyKind::CurrentState {
                instance,
                session,
                name,
            } = &key.kind
            else {
                continue;
            };
            staging
                .entry(instance.clone())
                .or_default()
                .entry(session.clone())
                .or_default()
                .insert(name.clone(), record.clone());
        }
        self.view = Arc::new(
            staging
                .into_iter()
                .map(|(instance, sessions)| (instance, Arc::new(sessions)))
                .collect(),
        );
    }

    /// The full immutable view.
    pub fn view(&self) -> Arc<CurrentStateView> {
        self.view.clone()
    }

    /// One instance's session map; empty if the instance reported nothing.
    pub fn states_for_instance(&self, instance: &str) -> Arc<SessionStateMap> {
        self.view
            .get(instance)
            .cloned()
            .unwrap_or_else(|| Arc::new(SessionStateMap::new()))
    }

    /// One (instance, session) state-name map; empty if absent.
    pub fn states_for_session(&self, instance: &str, session: &str) -> StateNameMap {
        self.view
            .get(instance)
            .and_then(|sessions| sessions.get(session))
            .cloned()
            .unwrap_or_default()
    }
}
