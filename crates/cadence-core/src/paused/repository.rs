//! Paused conversation repository trait.

use super::model::PausedConversation;
use crate::error::Result;
use async_trait::async_trait;

/// Row-level access to the `paused_conversations` table.
///
/// The single-row-per-user rule is enforced one level up, by the service that
/// deletes before it inserts. `claim_latest_for_user` must be a single
/// storage-level read-and-delete so two resumers cannot both receive a row.
#[async_trait]
pub trait PausedConversationRepository: Send + Sync {
    /// Inserts a row.
    async fn insert(&self, row: &PausedConversation) -> Result<()>;

    /// Returns the most recent row for `user_id`, if any.
    async fn find_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>>;

    /// Deletes every row for `user_id` and returns how many were removed.
    async fn delete_for_user(&self, user_id: &str) -> Result<usize>;

    /// Atomically deletes the rows for `user_id`, returning the most recent.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(row))`: A row was claimed; no later call will see it
    /// - `Ok(None)`: Nothing to claim (never paused, or already claimed)
    async fn claim_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>>;
}
