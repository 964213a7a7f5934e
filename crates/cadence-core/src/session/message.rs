//! Conversation message types.
//!
//! `Message` is the in-memory shape the session log holds; `MessageRow` is the
//! shape of a row in the remote `messages` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed or spoken by the end-user.
    User,
    /// Message produced by the AI coach.
    Assistant,
}

/// A single message in a session log.
///
/// Messages are identified by `id`; the session log never holds two messages
/// with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// Creates a message with a fresh UUID and the given timestamp.
    pub fn new(role: MessageRole, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at,
            metadata: None,
        }
    }

    /// Attaches an opaque metadata payload.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A row of the remote `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl MessageRow {
    /// Builds a row for `conversation_id` from a session message.
    pub fn from_message(conversation_id: impl Into<String>, message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            conversation_id: conversation_id.into(),
            role: message.role,
            content: message.content.clone(),
            created_at: message.created_at,
            metadata: message.metadata.clone(),
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            role: row.role,
            content: row.content,
            created_at: row.created_at,
            metadata: row.metadata,
        }
    }
}
