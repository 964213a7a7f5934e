//! Conversation gateway trait.
//!
//! Defines the interface to the remote `conversations` and `messages` tables.

use super::message::MessageRow;
use super::model::{Conversation, ConversationPatch};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract gateway to the hosted conversation tables.
///
/// This trait decouples the session layer from the concrete backend (hosted
/// Postgres behind a REST API, an in-memory table set for tests, ...).
///
/// # Implementation Notes
///
/// Implementations should:
/// - Return rows in the shapes described by [`Conversation`] and [`MessageRow`]
/// - Tolerate missing optional columns (`session_data`, `metadata`)
/// - Never retry on their own; callers decide what a failure means
#[async_trait]
pub trait ConversationGateway: Send + Sync {
    /// Finds a conversation row by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Conversation))`: Row found
    /// - `Ok(None)`: No such row
    /// - `Err(_)`: The backend could not be reached or answered badly
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    /// Lists the message rows of a conversation ordered by `created_at`.
    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>>;

    /// Applies a partial update to a conversation row.
    ///
    /// Returns a `NotFound` error if no row matches `conversation_id`.
    async fn update_conversation(&self, conversation_id: &str, patch: &ConversationPatch)
    -> Result<()>;

    /// Inserts a new conversation row.
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<()>;

    /// Inserts a new message row.
    async fn insert_message(&self, row: &MessageRow) -> Result<()>;
}
