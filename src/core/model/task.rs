// src/core/model/task.rs

//! Task-subsystem entities: job and workflow configs plus their runtime
//! contexts. The cache types and indexes them; their contents belong to the
//! task pipeline.

use super::typed_record;

typed_record! {
    /// A resource config claimed as a job.
    JobConfig
}

typed_record! {
    /// A resource config claimed as a workflow.
    WorkflowConfig
}

typed_record! {
    /// Runtime context of a job. May briefly outlive its config.
    JobContext
}

typed_record! {
    /// Runtime context of a workflow. May briefly outlive its config.
    WorkflowContext
}
