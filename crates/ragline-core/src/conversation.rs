//! Conversation controller.
//!
//! Owns the append-only message log and the send state machine:
//! `Idle --send--> Sending --success/failure--> Idle`. The log and the
//! state are owned here exclusively; presentation layers subscribe to
//! watch channels instead of holding loading flags of their own.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::message::Message;
use crate::session::SessionStore;
use crate::transport::{AskRequest, QaTransport};

/// Whether a send is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    /// No send in flight; a new one may be initiated.
    Idle,
    /// A question has been dispatched and its outcome is pending.
    Sending,
}

/// What `send` did with the input.
///
/// Rejections are silent: no log mutation, no state change, no
/// user-visible error. The enum makes them observable to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The question was dispatched and the exchange ran to completion
    /// (the assistant reply may be the connection-failure fallback).
    Sent,
    /// The trimmed input was empty; nothing happened.
    EmptyInput,
    /// A send was already in flight; nothing happened.
    Busy,
}

/// Fallback assistant reply appended when the backend cannot be reached.
pub const CONNECTION_FAILURE_REPLY: &str =
    "⚠️ **Connection error:** the answer service could not be reached.";

/// Drives the conversation with the QA backend.
///
/// `ConversationController` is responsible for:
/// - Appending user and assistant messages to the ordered log
/// - Enforcing the at-most-one-send-in-flight invariant
/// - Collapsing transport failures into the fixed fallback reply
/// - Publishing the send state and the scroll anchor for display surfaces
pub struct ConversationController {
    transport: Arc<dyn QaTransport>,
    sessions: Arc<dyn SessionStore>,
    log: Mutex<Vec<Message>>,
    state_tx: watch::Sender<SendState>,
    scroll_tx: watch::Sender<Option<usize>>,
}

impl ConversationController {
    /// Creates a controller with an empty log.
    pub fn new(transport: Arc<dyn QaTransport>, sessions: Arc<dyn SessionStore>) -> Self {
        let (state_tx, _) = watch::channel(SendState::Idle);
        let (scroll_tx, _) = watch::channel(None);
        Self {
            transport,
            sessions,
            log: Mutex::new(Vec::new()),
            state_tx,
            scroll_tx,
        }
    }

    /// Creates a controller whose log opens with an assistant greeting.
    pub fn with_greeting(
        transport: Arc<dyn QaTransport>,
        sessions: Arc<dyn SessionStore>,
        greeting: impl Into<String>,
    ) -> Self {
        let controller = Self::new(transport, sessions);
        controller.append(Message::assistant(greeting, Vec::new()));
        controller
    }

    /// Sends a question to the backend.
    ///
    /// Appends the user message immediately (optimistic append), then the
    /// assistant reply once the backend responds. A transport failure of
    /// any kind appends the fixed [`CONNECTION_FAILURE_REPLY`] instead;
    /// no error propagates out of this method. The state returns to
    /// [`SendState::Idle`] on every exit path, including cancellation of
    /// the returned future.
    pub async fn send(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::EmptyInput;
        }
        // Check-and-set in one step so two tasks cannot both pass the guard.
        let engaged = self.state_tx.send_if_modified(|state| {
            if *state == SendState::Sending {
                false
            } else {
                *state = SendState::Sending;
                true
            }
        });
        if !engaged {
            return SendOutcome::Busy;
        }
        let _idle_again = IdleOnDrop {
            state: self.state_tx.clone(),
        };

        self.append(Message::user(text));

        let session_id = self.sessions.get_or_create().await;
        debug!(session_id = %session_id, "dispatching question");

        let request = AskRequest {
            question: text.to_string(),
            session_id,
        };
        let reply = match self.transport.ask(request).await {
            Ok(response) => Message::assistant(response.answer, response.source_fragments),
            Err(err) => {
                warn!(error = %err, "ask request failed");
                Message::assistant(CONNECTION_FAILURE_REPLY, Vec::new())
            }
        };
        self.append(reply);

        SendOutcome::Sent
    }

    /// Returns a copy of the message log in conversation order.
    pub fn messages(&self) -> Vec<Message> {
        self.log_guard().clone()
    }

    /// Returns the number of messages in the log.
    pub fn message_count(&self) -> usize {
        self.log_guard().len()
    }

    /// Returns the current send state.
    pub fn state(&self) -> SendState {
        *self.state_tx.borrow()
    }

    /// Subscribes to send state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SendState> {
        self.state_tx.subscribe()
    }

    /// Index of the message a display surface should scroll to, i.e. the
    /// latest log entry. `None` until the first message is appended.
    pub fn scroll_anchor(&self) -> Option<usize> {
        *self.scroll_tx.borrow()
    }

    /// Subscribes to scroll anchor updates.
    pub fn subscribe_scroll_anchor(&self) -> watch::Receiver<Option<usize>> {
        self.scroll_tx.subscribe()
    }

    fn append(&self, message: Message) {
        let mut log = self.log_guard();
        log.push(message);
        self.scroll_tx.send_replace(Some(log.len() - 1));
    }

    fn log_guard(&self) -> MutexGuard<'_, Vec<Message>> {
        // Nothing panics while holding the lock; recover rather than poison-cascade.
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resets the send flag when dropped, so the controller can never be left
/// stuck in `Sending` by an early exit or a cancelled future.
struct IdleOnDrop {
    state: watch::Sender<SendState>,
}

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.state.send_replace(SendState::Idle);
    }
}
