// src/core/model/message.rs

//! Controller-to-participant messages pending under an instance's message
//! queue.

use super::typed_record;
use crate::core::record::{TypedRecord, fields};

typed_record! {
    /// One pending message. Targets exactly one instance; relay messages
    /// additionally name the participant forwarding them.
    Message
}

impl Message {
    pub fn id(&self) -> &str {
        self.name()
    }

    pub fn msg_type(&self) -> Option<&str> {
        self.record().field(fields::MSG_TYPE)
    }

    pub fn target_instance(&self) -> Option<&str> {
        self.record().field(fields::TGT_NAME)
    }

    /// The target's session at send time. A mismatch with the instance's
    /// current session means the message refers to a dead session.
    pub fn target_session(&self) -> Option<&str> {
        self.record().field(fields::TGT_SESSION_ID)
    }

    pub fn resource(&self) -> Option<&str> {
        self.record().field(fields::RESOURCE_NAME)
    }

    pub fn partition(&self) -> Option<&str> {
        self.record().field(fields::PARTITION_NAME)
    }

    pub fn from_state(&self) -> Option<&str> {
        self.record().field(fields::FROM_STATE)
    }

    pub fn to_state(&self) -> Option<&str> {
        self.record().field(fields::TO_STATE)
    }

    /// Whether this is a relay hand-off between participants.
    pub fn is_relay(&self) -> bool {
        self.record().field(fields::RELAY_PARTICIPANT).is_some()
    }

    pub fn relay_participant(&self) -> Option<&str> {
        self.record().field(fields::RELAY_PARTICIPANT)
    }
}
