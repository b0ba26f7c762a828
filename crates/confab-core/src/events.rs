//! Store event types

use serde::{Deserialize, Serialize};

use crate::conversation::Message;

/// Events emitted by the conversation store.
///
/// The rendering layer subscribes to these and re-reads its snapshot;
/// it never mutates the store directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A submit was accepted and the user message appended
    Submitted { message: Message },

    /// The remote service replied and the model message was appended
    ReplyReceived { message: Message },

    /// The request failed and a synthesized error message was appended
    Failed { message: Message },

    /// The store returned to idle (busy flag cleared)
    Idle,
}

impl StoreEvent {
    /// The appended message carried by this event, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            StoreEvent::Submitted { message }
            | StoreEvent::ReplyReceived { message }
            | StoreEvent::Failed { message } => Some(message),
            StoreEvent::Idle => None,
        }
    }
}
