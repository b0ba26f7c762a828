//! confab-core: conversation state and request lifecycle
//!
//! This crate owns the transcript and the single-in-flight submit
//! lifecycle: a submitted prompt appends a user message, goes out over
//! a [`GenerationClient`](confab_client::GenerationClient), and comes
//! back as exactly one model message (the reply or a synthesized
//! error), after which the store is ready for the next submit.

pub mod conversation;
pub mod events;
pub mod store;

pub use conversation::{Author, Conversation, Message};
pub use events::StoreEvent;
pub use store::{ConversationStore, SubmitOutcome};
