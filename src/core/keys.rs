// src/core/keys.rs

//! Typed property keys for the metadata-store tree.
//!
//! A key is a category tag plus its ordered parameters, modeled as a tagged
//! variant with named fields rather than a string path, so consumers never
//! index into parameter lists. Two keys compare equal iff category and all
//! parameters are equal.

use std::fmt;

/// The category-and-parameters part of a key, without the cluster scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    ClusterConfig,
    IdealStates,
    IdealState { resource: String },
    LiveInstances,
    LiveInstance { instance: String },
    InstanceConfigs,
    InstanceConfig { instance: String },
    ResourceConfigs,
    ResourceConfig { resource: String },
    StateModelDefs,
    StateModelDef { model: String },
    Constraints,
    Constraint { kind: String },
    MaintenanceSignal,
    ParticipantHistory { instance: String },
    CurrentStates { instance: String, session: String },
    CurrentState { instance: String, session: String, name: String },
    Messages { instance: String },
    Message { instance: String, id: String },
    TaskContexts,
    TaskContext { resource: String },
}

impl PropertyKind {
    /// A stable tag naming the category, shared by a parent listing key and
    /// the per-entry keys under it. Used for metric labels and op counters.
    pub fn category(&self) -> &'static str {
        match self {
            PropertyKind::ClusterConfig => "CLUSTERCONFIG",
            PropertyKind::IdealStates | PropertyKind::IdealState { .. } => "IDEALSTATES",
            PropertyKind::LiveInstances | PropertyKind::LiveInstance { .. } => "LIVEINSTANCES",
            PropertyKind::InstanceConfigs | PropertyKind::InstanceConfig { .. } => {
                "INSTANCECONFIGS"
            }
            PropertyKind::ResourceConfigs | PropertyKind::ResourceConfig { .. } => {
                "RESOURCECONFIGS"
            }
            PropertyKind::StateModelDefs | PropertyKind::StateModelDef { .. } => "STATEMODELDEFS",
            PropertyKind::Constraints | PropertyKind::Constraint { .. } => "CONSTRAINTS",
            PropertyKind::MaintenanceSignal => "MAINTENANCE",
            PropertyKind::ParticipantHistory { .. } => "HISTORY",
            PropertyKind::CurrentStates { .. } | PropertyKind::CurrentState { .. } => {
                "CURRENTSTATES"
            }
            PropertyKind::Messages { .. } | PropertyKind::Message { .. } => "MESSAGES",
            PropertyKind::TaskContexts | PropertyKind::TaskContext { .. } => "TASKCONTEXTS",
        }
    }

    /// The listing key this entry lives under, or `None` for keys that are
    /// not children of a listable parent.
    pub fn parent(&self) -> Option<PropertyKind> {
        match self {
            PropertyKind::IdealState { .. } => Some(PropertyKind::IdealStates),
            PropertyKind::LiveInstance { .. } => Some(PropertyKind::LiveInstances),
            PropertyKind::InstanceConfig { .. } => Some(PropertyKind::InstanceConfigs),
            PropertyKind::ResourceConfig { .. } => Some(PropertyKind::ResourceConfigs),
            PropertyKind::StateModelDef { .. } => Some(PropertyKind::StateModelDefs),
            PropertyKind::Constraint { .. } => Some(PropertyKind::Constraints),
            PropertyKind::CurrentState {
                instance, session, ..
            } => Some(PropertyKind::CurrentStates {
                instance: instance.clone(),
                session: session.clone(),
            }),
            PropertyKind::Message { instance, .. } => Some(PropertyKind::Messages {
                instance: instance.clone(),
            }),
            PropertyKind::TaskContext { .. } => Some(PropertyKind::TaskContexts),
            _ => None,
        }
    }

    /// The name this entry is listed under by its parent.
    pub fn leaf_name(&self) -> Option<&str> {
        match self {
            PropertyKind::IdealState { resource }
            | PropertyKind::ResourceConfig { resource }
            | PropertyKind::TaskContext { resource } => Some(resource),
            PropertyKind::LiveInstance { instance }
            | PropertyKind::InstanceConfig { instance } => Some(instance),
            PropertyKind::StateModelDef { model } => Some(model),
            PropertyKind::Constraint { kind } => Some(kind),
            PropertyKind::CurrentState { name, .. } => Some(name),
            PropertyKind::Message { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Builds the entry kind for a name listed under this parent kind.
    pub fn child(&self, name: &str) -> Option<PropertyKind> {
        let name = name.to_string();
        match self {
            PropertyKind::IdealStates => Some(PropertyKind::IdealState { resource: name }),
            PropertyKind::LiveInstances => Some(PropertyKind::LiveInstance { instance: name }),
            PropertyKind::InstanceConfigs => Some(PropertyKind::InstanceConfig { instance: name }),
            PropertyKind::ResourceConfigs => Some(PropertyKind::ResourceConfig { resource: name }),
            PropertyKind::StateModelDefs => Some(PropertyKind::StateModelDef { model: name }),
            PropertyKind::Constraints => Some(PropertyKind::Constraint { kind: name }),
            PropertyKind::CurrentStates { instance, session } => Some(PropertyKind::CurrentState {
                instance: instance.clone(),
                session: session.clone(),
                name,
            }),
            PropertyKind::Messages { instance } => Some(PropertyKind::Message {
                instance: instance.clone(),
                id: name,
            }),
            PropertyKind::TaskContexts => Some(PropertyKind::TaskContext { resource: name }),
            _ => None,
        }
    }
}

/// A fully scoped metadata-store key: cluster name plus [`PropertyKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub cluster: String,
    pub kind: PropertyKind,
}

impl PropertyKey {
    pub fn new(cluster: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            cluster: cluster.into(),
            kind,
        }
    }

    /// The entry key for a name listed under this key.
    pub fn child(&self, name: &str) -> Option<PropertyKey> {
        self.kind
            .child(name)
            .map(|kind| PropertyKey::new(self.cluster.clone(), kind))
    }

    /// Renders the slash path of this key, for logs and error messages.
    pub fn path(&self) -> String {
        let c = &self.cluster;
        match &self.kind {
            PropertyKind::ClusterConfig => format!("/{c}/CONFIGS/CLUSTER/{c}"),
            PropertyKind::IdealStates => format!("/{c}/IDEALSTATES"),
            PropertyKind::IdealState { resource } => format!("/{c}/IDEALSTATES/{resource}"),
            PropertyKind::LiveInstances => format!("/{c}/LIVEINSTANCES"),
            PropertyKind::LiveInstance { instance } => format!("/{c}/LIVEINSTANCES/{instance}"),
            PropertyKind::InstanceConfigs => format!("/{c}/CONFIGS/PARTICIPANT"),
            PropertyKind::InstanceConfig { instance } => {
                format!("/{c}/CONFIGS/PARTICIPANT/{instance}")
            }
            PropertyKind::ResourceConfigs => format!("/{c}/CONFIGS/RESOURCE"),
            PropertyKind::ResourceConfig { resource } => {
                format!("/{c}/CONFIGS/RESOURCE/{resource}")
            }
            PropertyKind::StateModelDefs => format!("/{c}/STATEMODELDEFS"),
            PropertyKind::StateModelDef { model } => format!("/{c}/STATEMODELDEFS/{model}"),
            PropertyKind::Constraints => format!("/{c}/CONSTRAINTS"),
            PropertyKind::Constraint { kind } => format!("/{c}/CONSTRAINTS/{kind}"),
            PropertyKind::MaintenanceSignal => format!("/{c}/CONTROLLER/MAINTENANCE"),
            PropertyKind::ParticipantHistory { instance } => {
                format!("/{c}/INSTANCES/{instance}/HISTORY")
            }
            PropertyKind::CurrentStates { instance, session } => {
                format!("/{c}/INSTANCES/{instance}/CURRENTSTATES/{session}")
            }
            PropertyKind::CurrentState {
                instance,
                session,
                name,
            } => format!("/{c}/INSTANCES/{instance}/CURRENTSTATES/{session}/{name}"),
            PropertyKind::Messages { instance } => format!("/{c}/INSTANCES/{instance}/MESSAGES"),
            PropertyKind::Message { instance, id } => {
                format!("/{c}/INSTANCES/{instance}/MESSAGES/{id}")
            }
            PropertyKind::TaskContexts => format!("/{c}/PROPERTYSTORE/TASKCONTEXTS"),
            PropertyKind::TaskContext { resource } => {
                format!("/{c}/PROPERTYSTORE/TASKCONTEXTS/{resource}")
            }
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Constructs typed keys scoped to one cluster.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    cluster: String,
}

impl KeyBuilder {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    fn key(&self, kind: PropertyKind) -> PropertyKey {
        PropertyKey::new(self.cluster.clone(), kind)
    }

    pub fn cluster_config(&self) -> PropertyKey {
        self.key(PropertyKind::ClusterConfig)
    }

    pub fn ideal_states(&self) -> PropertyKey {
        self.key(PropertyKind::IdealStates)
    }

    pub fn ideal_state(&self, resource: &str) -> PropertyKey {
        self.key(PropertyKind::IdealState {
            resource: resource.to_string(),
        })
    }

    pub fn live_instances(&self) -> PropertyKey {
        self.key(PropertyKind::LiveInstances)
    }

    pub fn live_instance(&self, instance: &str) -> PropertyKey {
        self.key(PropertyKind::LiveInstance {
            instance: instance.to_string(),
        })
    }

    pub fn instance_configs(&self) -> PropertyKey {
        self.key(PropertyKind::InstanceConfigs)
    }

    pub fn instance_config(&self, instance: &str) -> PropertyKey {
        self.key(PropertyKind::InstanceConfig {
            instance: instance.to_string(),
        })
    }

    pub fn resource_configs(&self) -> PropertyKey {
        self.key(PropertyKind::ResourceConfigs)
    }

    pub fn resource_config(&self, resource: &str) -> PropertyKey {
        self.key(PropertyKind::ResourceConfig {
            resource: resource.to_string(),
        })
    }

    pub fn state_model_defs(&self) -> PropertyKey {
        self.key(PropertyKind::StateModelDefs)
    }

    pub fn state_model_def(&self, model: &str) -> PropertyKey {
        self.key(PropertyKind::StateModelDef {
            model: model.to_string(),
        })
    }

    pub fn constraints(&self) -> PropertyKey {
        self.key(PropertyKind::Constraints)
    }

    pub fn constraint(&self, kind: &str) -> PropertyKey {
        self.key(PropertyKind::Constraint {
            kind: kind.to_string(),
        })
    }

    pub fn maintenance_signal(&self) -> PropertyKey {
        self.key(PropertyKind::MaintenanceSignal)
    }

    pub fn participant_history(&self, instance: &str) -> PropertyKey {
        self.key(PropertyKind::ParticipantHistory {
            instance: instance.to_string(),
        })
    }

    pub fn current_states(&self, instance: &str, session: &str) -> PropertyKey {
        self.key(PropertyKind::CurrentStates {
            instance: instance.to_string(),
            session: session.to_string(),
        })
    }

    pub fn current_state(&self, instance: &str, session: &str, name: &str) -> PropertyKey {
        self.key(PropertyKind::CurrentState {
            instance: instance.to_string(),
            session: session.to_string(),
            name: name.to_string(),
        })
    }

    pub fn messages(&self, instance: &str) -> PropertyKey {
        self.key(PropertyKind::Messages {
            instance: instance.to_string(),
        })
    }

    pub fn message(&self, instance: &str, id: &str) -> PropertyKey {
        self.key(PropertyKind::Message {
            instance: instance.to_string(),
            id: id.to_string(),
        })
    }

    pub fn task_contexts(&self) -> PropertyKey {
        self.key(PropertyKind::TaskContexts)
    }

    pub fn task_context(&self, resource: &str) -> PropertyKey {
        self.key(PropertyKind::TaskContext {
            resource: resource.to_string(),
        })
    }
}
