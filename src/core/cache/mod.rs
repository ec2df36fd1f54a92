// src/core/cache/mod.rs

//! The snapshot cache itself: change tracking, the three sub-caches, and the
//! aggregator that owns them and publishes the read view.

pub mod change;
pub mod cluster_data;
pub mod current_state;
pub mod messages;
pub mod snapshot;
mod stat_compare;
pub mod task_data;

// Re-export key types for easier access from other modules.
pub use change::{ChangeCategory, DirtyTable};
pub use cluster_data::ClusterDataCache;
pub use current_state::{CurrentStateCache, CurrentStateView, SessionStateMap, StateNameMap};
pub use messages::{DefaultRelayFilter, InstanceMessagesCache, RelayMessageFilter};
pub use snapshot::ClusterSnapshot;
pub use task_data::TaskDataCache;
