//! In-memory implementation of the persistence gateway.
//!
//! Holds the three tables in process memory behind one lock, which makes
//! `claim_latest_for_user` trivially atomic. Used by offline hosts and tests;
//! `set_offline(true)` makes every call fail the way an unreachable backend
//! would.

use async_trait::async_trait;
use cadence_core::CadenceError;
use cadence_core::error::Result;
use cadence_core::paused::{PausedConversation, PausedConversationRepository};
use cadence_core::session::{Conversation, ConversationGateway, ConversationPatch, MessageRow};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    conversations: HashMap<String, Conversation>,
    messages: HashMap<String, Vec<MessageRow>>,
    paused: Vec<PausedConversation>,
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: Mutex<Tables>,
    offline: AtomicBool,
    conversation_updates: AtomicUsize,
    paused_inserts: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an unreachable backend.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful `update_conversation` calls.
    pub fn conversation_update_count(&self) -> usize {
        self.conversation_updates.load(Ordering::SeqCst)
    }

    /// Number of successful paused-row inserts.
    pub fn paused_insert_count(&self) -> usize {
        self.paused_inserts.load(Ordering::SeqCst)
    }

    /// Number of paused rows currently stored for `user_id`.
    pub async fn paused_row_count(&self, user_id: &str) -> usize {
        let tables = self.tables.lock().await;
        tables.paused.iter().filter(|r| r.user_id == user_id).count()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CadenceError::gateway("gateway offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationGateway for InMemoryGateway {
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.conversations.get(conversation_id).cloned())
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        let mut rows = tables
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    async fn update_conversation(
        &self,
        conversation_id: &str,
        patch: &ConversationPatch,
    ) -> Result<()> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        let conversation = tables
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| CadenceError::not_found("conversation", conversation_id))?;
        conversation.apply(patch);
        self.conversation_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        tables
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn insert_message(&self, row: &MessageRow) -> Result<()> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        tables
            .messages
            .entry(row.conversation_id.clone())
            .or_default()
            .push(row.clone());
        Ok(())
    }
}

#[async_trait]
impl PausedConversationRepository for InMemoryGateway {
    async fn insert(&self, row: &PausedConversation) -> Result<()> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        tables.paused.push(row.clone());
        self.paused_inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .paused
            .iter()
            .filter(|row| row.user_id == user_id)
            .max_by_key(|row| row.created_at)
            .cloned())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        let before = tables.paused.len();
        tables.paused.retain(|row| row.user_id != user_id);
        Ok(before - tables.paused.len())
    }

    async fn claim_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        let (claimed, kept): (Vec<_>, Vec<_>) = tables
            .paused
            .drain(..)
            .partition(|row| row.user_id == user_id);
        tables.paused = kept;
        Ok(claimed.into_iter().max_by_key(|row| row.created_at))
    }
}
