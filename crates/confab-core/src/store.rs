//! The conversation store: serializes the submit -> respond lifecycle.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{Notify, broadcast};
use tokio_util::sync::CancellationToken;

use confab_client::GenerationClient;

use crate::conversation::{Conversation, Message};
use crate::events::StoreEvent;

/// Result of a submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The user message was appended and a request is in flight
    Accepted,
    /// A request is already in flight; nothing changed
    RejectedBusy,
    /// The input was empty or whitespace-only; nothing changed
    RejectedEmpty,
    /// The store has been closed; nothing changed
    RejectedClosed,
}

impl SubmitOutcome {
    /// Whether the submit was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

struct Inner {
    state: Mutex<Conversation>,
    event_tx: broadcast::Sender<StoreEvent>,
    cancel: CancellationToken,
    idle_notify: Notify,
}

impl Inner {
    /// Append the terminal message for the in-flight request and clear
    /// the busy flag. All completions funnel through here, so the
    /// append-only ordering holds no matter which task ran the request.
    fn complete(&self, message: Message, event: StoreEvent) {
        {
            let mut state = self.state.lock();
            state.messages.push(message);
            state.busy = false;
        }
        let _ = self.event_tx.send(event);
        let _ = self.event_tx.send(StoreEvent::Idle);
        self.idle_notify.notify_waiters();
    }
}

/// The sole owner of conversation state.
///
/// Cheaply cloneable handle (all state is `Arc`-backed). At most one
/// request is in flight per store; additional submits are rejected
/// while busy rather than queued. Every accepted submit is eventually
/// answered by exactly one model message unless the store is closed
/// first.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Inner>,
    client: Arc<dyn GenerationClient>,
}

impl ConversationStore {
    /// Create a store backed by the given generation client.
    ///
    /// The client is injected rather than constructed here so callers
    /// share one instance and tests substitute a mock.
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(Conversation::default()),
                event_tx,
                cancel: CancellationToken::new(),
                idle_notify: Notify::new(),
            }),
            client,
        }
    }

    /// Subscribe to store events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Get a snapshot of the current conversation state
    pub fn snapshot(&self) -> Conversation {
        self.inner.state.lock().clone()
    }

    /// Get a copy of the transcript
    pub fn messages(&self) -> Vec<Message> {
        self.inner.state.lock().messages.clone()
    }

    /// Whether a request is currently in flight
    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().busy
    }

    /// Whether the store has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Submit user text for generation.
    ///
    /// Trims the input and rejects empty submissions, submissions while
    /// a request is in flight, and submissions after `close`. On
    /// acceptance the user message is appended and the busy flag set
    /// before this returns; the network round-trip then runs on a
    /// spawned task and terminates in exactly one model message (the
    /// reply, or a synthesized error line). One network attempt per
    /// accepted submit, no retries.
    pub fn submit(&self, text: &str) -> SubmitOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::RejectedEmpty;
        }
        if self.inner.cancel.is_cancelled() {
            return SubmitOutcome::RejectedClosed;
        }

        let message = Message::user(trimmed);
        {
            let mut state = self.inner.state.lock();
            if state.busy {
                tracing::debug!("submit rejected: request already in flight");
                return SubmitOutcome::RejectedBusy;
            }
            state.messages.push(message.clone());
            state.busy = true;
        }
        let _ = self.inner.event_tx.send(StoreEvent::Submitted { message });

        let prompt = trimmed.to_string();
        let inner = Arc::clone(&self.inner);
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = inner.cancel.cancelled() => {
                    // Session torn down mid-request: the state was
                    // already settled by close(), leave it untouched.
                    tracing::debug!("in-flight request cancelled");
                    return;
                }
                result = client.generate(&prompt) => result,
            };
            if inner.cancel.is_cancelled() {
                return;
            }

            match result {
                Ok(reply) => {
                    let message = Message::model(reply.text);
                    inner.complete(
                        message.clone(),
                        StoreEvent::ReplyReceived { message },
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "generation request failed");
                    let message = Message::model(format!("Error: An issue occurred. {e}"));
                    inner.complete(message.clone(), StoreEvent::Failed { message });
                }
            }
        });

        SubmitOutcome::Accepted
    }

    /// Close the store, cancelling any in-flight request.
    ///
    /// The cancelled request's eventual completion makes no state
    /// mutation. The busy flag is cleared here so it cannot leak.
    pub fn close(&self) {
        self.inner.cancel.cancel();
        {
            let mut state = self.inner.state.lock();
            state.busy = false;
        }
        self.inner.idle_notify.notify_waiters();
    }

    /// Wait until no request is in flight.
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.inner.idle_notify.notified();
            tokio::pin!(notified);
            // Register before checking so a completion between the
            // check and the await cannot be missed.
            notified.as_mut().enable();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }

    /// Wait until idle, with a timeout. Returns `true` if idle was
    /// reached, `false` on timeout.
    pub async fn wait_for_idle_timeout(&self, timeout: std::time::Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_for_idle())
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Author;
    use async_trait::async_trait;
    use confab_client::{Error as ClientError, GenerationReply};
    use std::time::Duration;

    /// A mock client that returns canned results in order.
    struct MockClient {
        results: Mutex<Vec<Result<GenerationReply, ClientError>>>,
    }

    impl MockClient {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(vec![Ok(GenerationReply {
                    text: text.to_string(),
                })]),
            })
        }

        fn failing(error: ClientError) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(vec![Err(error)]),
            })
        }
    }

    #[async_trait]
    impl GenerationClient for MockClient {
        async fn generate(&self, _prompt: &str) -> confab_client::Result<GenerationReply> {
            let mut results = self.results.lock();
            if results.is_empty() {
                Ok(GenerationReply {
                    text: "canned".to_string(),
                })
            } else {
                results.remove(0)
            }
        }
    }

    /// A mock client that blocks until released, for in-flight tests.
    struct BlockingClient {
        release: Notify,
        reply: String,
    }

    impl BlockingClient {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                release: Notify::new(),
                reply: reply.to_string(),
            })
        }
    }

    #[async_trait]
    impl GenerationClient for BlockingClient {
        async fn generate(&self, _prompt: &str) -> confab_client::Result<GenerationReply> {
            self.release.notified().await;
            Ok(GenerationReply {
                text: self.reply.clone(),
            })
        }
    }

    const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_submit_success_appends_user_then_model() {
        let store = ConversationStore::new(MockClient::replying("The Civic."));
        assert!(store.submit("best car?").is_accepted());
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        let state = store.snapshot();
        assert!(!state.busy);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0], Message::user("best car?"));
        assert_eq!(state.messages[1], Message::model("The Civic."));
    }

    #[tokio::test]
    async fn test_submit_failure_appends_error_message() {
        let store = ConversationStore::new(MockClient::failing(ClientError::Timeout));
        assert!(store.submit("best car?").is_accepted());
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        let state = store.snapshot();
        assert!(!state.busy);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].author, Author::Model);
        assert_eq!(
            state.messages[1].text,
            "Error: An issue occurred. request timed out"
        );
    }

    #[tokio::test]
    async fn test_non_2xx_becomes_error_message() {
        let store = ConversationStore::new(MockClient::failing(ClientError::Status {
            status: 500,
            body: "boom".to_string(),
        }));
        store.submit("hello");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        let last = store.messages().pop().unwrap();
        assert_eq!(last.author, Author::Model);
        assert!(last.text.starts_with("Error: An issue occurred."));
        assert!(last.text.contains("500"));
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let store = ConversationStore::new(MockClient::replying("unused"));
        assert_eq!(store.submit(""), SubmitOutcome::RejectedEmpty);
        assert_eq!(store.submit("   "), SubmitOutcome::RejectedEmpty);
        assert_eq!(store.submit("\n\t"), SubmitOutcome::RejectedEmpty);

        let state = store.snapshot();
        assert!(state.messages.is_empty());
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn test_input_is_trimmed_before_append() {
        let store = ConversationStore::new(MockClient::replying("ok"));
        store.submit("  hello  ");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);
        assert_eq!(store.messages()[0].text, "hello");
    }

    #[tokio::test]
    async fn test_submit_while_busy_is_rejected() {
        let client = BlockingClient::new("first reply");
        let store = ConversationStore::new(client.clone());

        assert!(store.submit("a").is_accepted());
        assert!(store.is_busy());
        assert_eq!(store.submit("b"), SubmitOutcome::RejectedBusy);

        // The rejection changed nothing.
        let state = store.snapshot();
        assert_eq!(state.messages.len(), 1);
        assert!(state.busy);

        client.release.notify_one();
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        // Exactly one exchange: the rejected submit left no trace.
        let state = store.snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0], Message::user("a"));
        assert_eq!(state.messages[1], Message::model("first reply"));
    }

    #[tokio::test]
    async fn test_next_submit_accepted_after_completion() {
        let store = ConversationStore::new(Arc::new(MockClient {
            results: Mutex::new(vec![
                Ok(GenerationReply {
                    text: "one".to_string(),
                }),
                Ok(GenerationReply {
                    text: "two".to_string(),
                }),
            ]),
        }));

        store.submit("first");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);
        assert!(store.submit("second").is_accepted());
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        let messages = store.messages();
        assert_eq!(messages.len(), 4);
        // Every user turn is answered by exactly one model message.
        assert_eq!(messages[0].author, Author::User);
        assert_eq!(messages[1].author, Author::Model);
        assert_eq!(messages[2].author, Author::User);
        assert_eq!(messages[3].author, Author::Model);
    }

    #[tokio::test]
    async fn test_transcript_is_append_only() {
        let store = ConversationStore::new(Arc::new(MockClient {
            results: Mutex::new(vec![
                Ok(GenerationReply {
                    text: "one".to_string(),
                }),
                Err(ClientError::Timeout),
            ]),
        }));

        store.submit("first");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);
        let before = store.messages();

        store.submit("second");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);
        let after = store.messages();

        assert!(after.len() > before.len());
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[tokio::test]
    async fn test_busy_clears_on_failure() {
        let store = ConversationStore::new(MockClient::failing(ClientError::Status {
            status: 404,
            body: String::new(),
        }));
        store.submit("hello");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);
        assert!(!store.is_busy());
        assert!(store.submit("again").is_accepted());
    }

    #[tokio::test]
    async fn test_close_mid_request_discards_completion() {
        let client = BlockingClient::new("too late");
        let store = ConversationStore::new(client.clone());

        store.submit("hello");
        assert!(store.is_busy());
        store.close();
        assert!(!store.is_busy());

        // Release the blocked request; its completion must not land.
        client.release.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let state = store.snapshot();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0], Message::user("hello"));
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn test_submit_after_close_is_rejected() {
        let store = ConversationStore::new(MockClient::replying("unused"));
        assert!(!store.is_closed());
        store.close();
        assert!(store.is_closed());
        assert_eq!(store.submit("hello"), SubmitOutcome::RejectedClosed);
        assert!(store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_events_follow_the_lifecycle() {
        let store = ConversationStore::new(MockClient::replying("hi"));
        let mut events = store.subscribe();

        store.submit("hello");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        let submitted = events.recv().await.unwrap();
        assert!(matches!(submitted, StoreEvent::Submitted { .. }));
        assert_eq!(submitted.message().unwrap().text, "hello");

        let replied = events.recv().await.unwrap();
        assert!(matches!(replied, StoreEvent::ReplyReceived { .. }));
        assert_eq!(replied.message().unwrap().text, "hi");

        let idle = events.recv().await.unwrap();
        assert!(matches!(idle, StoreEvent::Idle));
        assert!(idle.message().is_none());
    }

    #[tokio::test]
    async fn test_failed_event_on_error() {
        let store = ConversationStore::new(MockClient::failing(ClientError::Timeout));
        let mut events = store.subscribe();

        store.submit("hello");
        assert!(store.wait_for_idle_timeout(IDLE_TIMEOUT).await);

        let _submitted = events.recv().await.unwrap();
        let failed = events.recv().await.unwrap();
        assert!(matches!(failed, StoreEvent::Failed { .. }));
    }

    #[tokio::test]
    async fn test_wait_for_idle_returns_immediately_when_idle() {
        let store = ConversationStore::new(MockClient::replying("unused"));
        assert!(store.wait_for_idle_timeout(Duration::from_millis(10)).await);
    }
}
