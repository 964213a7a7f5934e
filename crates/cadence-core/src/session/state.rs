//! In-memory session state.
//!
//! `SessionState` holds the active conversation and its message log. The
//! `has_active_session` and `is_paused` flags are never stored: they are read
//! off `conversation.status` every time, so no transition can leave them out
//! of step with it.

use super::message::Message;
use super::model::{Conversation, ConversationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct SessionState {
    conversation: Option<Conversation>,
    messages: Vec<Message>,
    seen_ids: HashSet<String>,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    /// An empty state with no conversation loaded.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            conversation: None,
            messages: Vec::new(),
            seen_ids: HashSet::new(),
            last_activity: now,
        }
    }

    /// Replaces the state with `conversation` marked active and an empty log.
    pub fn start(&mut self, mut conversation: Conversation, now: DateTime<Utc>) {
        conversation.status = ConversationStatus::Active;
        self.replace(conversation, Vec::new(), now);
    }

    /// Replaces the state with `conversation` and a copy of `messages`.
    ///
    /// The conversation keeps its own status. Duplicate ids in `messages` are
    /// collapsed to their first occurrence.
    pub fn resume(&mut self, conversation: Conversation, messages: &[Message], now: DateTime<Utc>) {
        self.replace(conversation, messages.to_vec(), now);
    }

    /// Overwrites conversation, log and last-activity wholesale.
    pub fn replace(
        &mut self,
        conversation: Conversation,
        messages: Vec<Message>,
        last_activity: DateTime<Utc>,
    ) {
        self.conversation = Some(conversation);
        self.messages.clear();
        self.seen_ids.clear();
        for message in messages {
            if self.seen_ids.insert(message.id.clone()) {
                self.messages.push(message);
            }
        }
        self.last_activity = last_activity;
    }

    /// Appends `message` unless its id is already in the log.
    ///
    /// Returns `false` for a duplicate; the log and last-activity are left
    /// untouched in that case.
    pub fn add_message(&mut self, message: Message, now: DateTime<Utc>) -> bool {
        if !self.seen_ids.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        self.last_activity = now;
        true
    }

    /// Sets the status of the loaded conversation. Returns `false` if none.
    pub fn set_status(&mut self, status: ConversationStatus) -> bool {
        match self.conversation.as_mut() {
            Some(conversation) => {
                conversation.status = status;
                true
            }
            None => false,
        }
    }

    pub fn conversation_mut(&mut self) -> Option<&mut Conversation> {
        self.conversation.as_mut()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Drops the conversation and the log.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::empty(now);
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn has_active_session(&self) -> bool {
        self.status() == Some(ConversationStatus::Active)
    }

    pub fn is_paused(&self) -> bool {
        self.status() == Some(ConversationStatus::Paused)
    }

    fn status(&self) -> Option<ConversationStatus> {
        self.conversation.as_ref().map(|c| c.status)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conversation: self.conversation.clone(),
            messages: self.messages.clone(),
            has_active_session: self.has_active_session(),
            is_paused: self.is_paused(),
            last_activity: self.last_activity,
        }
    }
}

/// Read-only copy of the session state handed to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub conversation: Option<Conversation>,
    pub messages: Vec<Message>,
    pub has_active_session: bool,
    pub is_paused: bool,
    pub last_activity: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::MessageRole;

    fn message(id: &str) -> Message {
        Message {
            id: id.to_string(),
            role: MessageRole::User,
            content: format!("content {}", id),
            created_at: Utc::now(),
            metadata: None,
        }
    }

    fn assert_flags_follow_status(state: &SessionState) {
        let status = state.conversation().map(|c| c.status);
        assert_eq!(
            state.has_active_session(),
            status == Some(ConversationStatus::Active)
        );
        assert_eq!(state.is_paused(), status == Some(ConversationStatus::Paused));
    }

    #[test]
    fn test_start_forces_active() {
        let mut state = SessionState::empty(Utc::now());
        let mut conversation = Conversation::new("Intro", 30, Utc::now());
        conversation.status = ConversationStatus::Paused;

        state.start(conversation, Utc::now());
        assert!(state.has_active_session());
        assert!(!state.is_paused());
        assert!(state.messages().is_empty());
    }

    #[test]
    fn test_resume_keeps_status_and_copies_messages() {
        let mut state = SessionState::empty(Utc::now());
        let mut conversation = Conversation::new("Intro", 30, Utc::now());
        conversation.status = ConversationStatus::Paused;
        let mut source = vec![message("a"), message("b")];

        state.resume(conversation, &source, Utc::now());
        source.push(message("c"));

        assert_eq!(state.messages().len(), 2);
        assert!(state.is_paused());
        assert!(!state.has_active_session());
    }

    #[test]
    fn test_add_message_ignores_duplicates_and_keeps_order() {
        let mut state = SessionState::empty(Utc::now());
        state.start(Conversation::new("Intro", 30, Utc::now()), Utc::now());

        let ids = ["a", "b", "a", "c", "b", "d", "c"];
        let appended: Vec<bool> = ids
            .iter()
            .map(|id| state.add_message(message(id), Utc::now()))
            .collect();

        assert_eq!(appended, vec![true, true, false, true, false, true, false]);
        let log: Vec<&str> = state.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(log, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_flags_follow_every_status() {
        let mut state = SessionState::empty(Utc::now());
        assert_flags_follow_status(&state);

        state.start(Conversation::new("Intro", 30, Utc::now()), Utc::now());
        for status in [
            ConversationStatus::Paused,
            ConversationStatus::Active,
            ConversationStatus::Completed,
            ConversationStatus::Terminated,
        ] {
            assert!(state.set_status(status));
            assert_flags_follow_status(&state);
        }

        state.reset(Utc::now());
        assert_flags_follow_status(&state);
        assert!(!state.set_status(ConversationStatus::Active));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = SessionState::empty(Utc::now());
        state.start(Conversation::new("Intro", 30, Utc::now()), Utc::now());
        state.add_message(message("a"), Utc::now());

        let snapshot = state.snapshot();
        assert!(snapshot.has_active_session);
        assert!(!snapshot.is_paused);
        assert_eq!(snapshot.messages.len(), 1);
    }
}
