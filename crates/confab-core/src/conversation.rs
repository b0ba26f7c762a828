//! Conversation state: the transcript and the busy flag.

use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Model,
}

/// A single message in the transcript.
///
/// Messages are immutable values: created on append, never mutated,
/// never deleted within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message content
    pub text: String,
    /// Author of the message
    pub author: Author,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: Author::User,
        }
    }

    /// Create a model message
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: Author::Model,
        }
    }

    /// Whether this message was authored by the user
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Snapshot of conversation state: transcript plus the busy flag.
///
/// The transcript is append-only; insertion order is display order.
/// `busy` is true from the moment a submit is accepted until the
/// corresponding reply or error message has been appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Ordered transcript
    pub messages: Vec<Message>,
    /// Whether a request is currently in flight
    pub busy: bool,
}

impl Conversation {
    /// The most recent message, if any
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Author::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Author::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn test_message_constructors() {
        let m = Message::user("hello");
        assert!(m.is_user());
        assert_eq!(m.text, "hello");

        let m = Message::model("hi there");
        assert!(!m.is_user());
        assert_eq!(m.author, Author::Model);
    }

    #[test]
    fn test_default_conversation_is_empty_and_idle() {
        let conversation = Conversation::default();
        assert!(conversation.messages.is_empty());
        assert!(!conversation.busy);
        assert!(conversation.last().is_none());
    }
}
