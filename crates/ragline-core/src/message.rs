//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation
//! log, including roles and the supporting document fragments an assistant
//! answer was produced from.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the answering backend.
    Assistant,
}

/// A single message in a conversation log.
///
/// Messages are immutable once appended to the log. User messages never
/// carry sources; assistant messages carry the document fragments the
/// backend reported using, which may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message (markdown for assistant answers).
    pub content: String,
    /// Document fragments supporting an assistant answer.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub created_at: String,
}

impl Message {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            sources: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Creates an assistant message with its supporting fragments.
    pub fn assistant(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            sources,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
