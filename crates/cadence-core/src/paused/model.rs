//! Paused conversation record.

use crate::error::Result;
use crate::session::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when the caller does not supply one.
pub const DEFAULT_PAUSED_TITLE: &str = "Paused Conversation";

/// A row of the remote `paused_conversations` table.
///
/// `messages` holds the serialized message history as a JSON array so the
/// row can be resumed without touching the primary `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PausedConversation {
    pub id: String,
    pub user_id: String,
    pub messages: serde_json::Value,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl PausedConversation {
    /// Builds a new row for `user_id`, serializing `messages`.
    pub fn new(
        user_id: impl Into<String>,
        messages: &[Message],
        title: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            messages: serde_json::to_value(messages)?,
            title: title.unwrap_or(DEFAULT_PAUSED_TITLE).to_string(),
            created_at,
        })
    }

    /// Deserializes the stored message history.
    pub fn decode_messages(&self) -> Result<Vec<Message>> {
        Ok(serde_json::from_value(self.messages.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageRole;

    #[test]
    fn test_default_title() {
        let row = PausedConversation::new("user-1", &[], None, Utc::now()).unwrap();
        assert_eq!(row.title, DEFAULT_PAUSED_TITLE);
        assert_eq!(row.messages, serde_json::json!([]));
    }

    #[test]
    fn test_messages_round_trip() {
        let messages = vec![
            Message::new(MessageRole::User, "I slept badly", Utc::now()),
            Message::new(MessageRole::Assistant, "Tell me more", Utc::now())
                .with_metadata(serde_json::json!({"tone": "warm"})),
        ];
        let row = PausedConversation::new("user-1", &messages, Some("Evening"), Utc::now()).unwrap();

        assert_eq!(row.title, "Evening");
        assert_eq!(row.decode_messages().unwrap(), messages);
    }

    #[test]
    fn test_corrupt_history_is_an_error() {
        let mut row = PausedConversation::new("user-1", &[], None, Utc::now()).unwrap();
        row.messages = serde_json::json!({"not": "a list"});
        assert!(row.decode_messages().unwrap_err().is_serialization());
    }
}
