//! Conversation domain model.
//!
//! A `Conversation` doubles as the row shape of the remote `conversations`
//! table; auxiliary metadata travels in the opaque `session_data` bag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Paused,
    Completed,
    Terminated,
}

impl ConversationStatus {
    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
        }
    }
}

/// A coaching conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format)
    pub id: String,
    /// Owning user, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub title: String,
    pub status: ConversationStatus,
    /// Elapsed duration recorded on completion
    #[serde(default)]
    pub duration_minutes: u32,
    /// Configured cap for the session length
    pub max_duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    /// Personality insight payload produced after the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Value>,
    /// Behavioural signal payload produced after the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<Value>,
    /// Opaque auxiliary metadata (pause/completion snapshots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_data: Option<Value>,
}

impl Conversation {
    /// Creates an active conversation with a fresh UUID.
    pub fn new(title: impl Into<String>, max_duration_minutes: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            title: title.into(),
            status: ConversationStatus::Active,
            duration_minutes: 0,
            max_duration_minutes,
            started_at,
            insights: None,
            signals: None,
            session_data: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns `session_data` with `entries` merged over it.
    ///
    /// A non-object `session_data` is replaced rather than merged.
    pub fn merged_session_data(&self, entries: Map<String, Value>) -> Value {
        let mut merged = match &self.session_data {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        merged.extend(entries);
        Value::Object(merged)
    }

    /// Applies a patch in place, mirroring what the gateway writes.
    pub fn apply(&mut self, patch: &ConversationPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(session_data) = &patch.session_data {
            self.session_data = Some(session_data.clone());
        }
    }
}

/// Partial update written to the `conversations` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_data: Option<Value>,
}

impl ConversationPatch {
    pub fn status(status: ConversationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_session_data(mut self, session_data: Value) -> Self {
        self.session_data = Some(session_data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ConversationStatus::Terminated).unwrap(),
            json!("terminated")
        );
        assert_eq!(ConversationStatus::Paused.as_str(), "paused");
    }

    #[test]
    fn test_merged_session_data_keeps_existing_keys() {
        let mut conversation = Conversation::new("Check-in", 30, Utc::now());
        conversation.session_data = Some(json!({"mood": "calm", "message_count": 1}));

        let mut entries = Map::new();
        entries.insert("message_count".to_string(), json!(4));
        let merged = conversation.merged_session_data(entries);

        assert_eq!(merged, json!({"mood": "calm", "message_count": 4}));
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = ConversationPatch::status(ConversationStatus::Paused);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"status": "paused"}));
    }

    #[test]
    fn test_apply_patch() {
        let mut conversation = Conversation::new("Check-in", 30, Utc::now());
        let patch = ConversationPatch::status(ConversationStatus::Completed)
            .with_duration_minutes(12)
            .with_session_data(json!({"message_count": 3}));
        conversation.apply(&patch);

        assert_eq!(conversation.status, ConversationStatus::Completed);
        assert_eq!(conversation.duration_minutes, 12);
        assert_eq!(conversation.session_data, Some(json!({"message_count": 3})));
    }
}
