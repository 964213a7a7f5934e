//! Pause buffer service.
//!
//! Keeps at most one paused conversation per user on top of a
//! [`PausedConversationRepository`]. Resuming claims the row, so a paused
//! conversation can be continued exactly once.

use cadence_core::clock::{Clock, SystemClock};
use cadence_core::error::Result;
use cadence_core::paused::{PausedConversation, PausedConversationRepository};
use cadence_core::session::Message;
use std::sync::Arc;

pub struct PausedConversationService {
    repository: Arc<dyn PausedConversationRepository>,
    clock: Arc<dyn Clock>,
}

impl PausedConversationService {
    pub fn new(repository: Arc<dyn PausedConversationRepository>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<dyn PausedConversationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, clock }
    }

    /// Stores `messages` as the user's only paused conversation.
    ///
    /// Any earlier row for the user is deleted first. Two tabs pausing at the
    /// same moment can both delete before either inserts; whichever insert
    /// lands last is what `get_paused_conversation` reports.
    pub async fn pause_conversation(
        &self,
        user_id: &str,
        messages: &[Message],
        title: Option<&str>,
    ) -> Result<PausedConversation> {
        let row = PausedConversation::new(user_id, messages, title, self.clock.now())?;

        let replaced = self.repository.delete_for_user(user_id).await?;
        if replaced > 0 {
            tracing::debug!(
                "[PausedConversationService] Replacing {} paused row(s) for user {}",
                replaced,
                user_id
            );
        }

        self.repository.insert(&row).await?;
        tracing::info!(
            "[PausedConversationService] Paused '{}' for user {} ({} messages)",
            row.title,
            user_id,
            messages.len()
        );
        Ok(row)
    }

    pub async fn get_paused_conversation(&self, user_id: &str) -> Result<Option<PausedConversation>> {
        self.repository.find_latest_for_user(user_id).await
    }

    /// Claims the user's paused conversation and returns its messages.
    ///
    /// `Ok(None)` means there was nothing to continue, including the case
    /// where another caller already claimed it.
    pub async fn continue_paused_conversation(&self, user_id: &str) -> Result<Option<Vec<Message>>> {
        let Some(row) = self.repository.claim_latest_for_user(user_id).await? else {
            tracing::debug!(
                "[PausedConversationService] Nothing to continue for user {}",
                user_id
            );
            return Ok(None);
        };

        let messages = row.decode_messages()?;
        tracing::info!(
            "[PausedConversationService] Continued '{}' for user {} ({} messages)",
            row.title,
            user_id,
            messages.len()
        );
        Ok(Some(messages))
    }

    pub async fn clear_paused_conversation(&self, user_id: &str) -> Result<()> {
        let removed = self.repository.delete_for_user(user_id).await?;
        tracing::debug!(
            "[PausedConversationService] Cleared {} paused row(s) for user {}",
            removed,
            user_id
        );
        Ok(())
    }

    pub async fn has_paused_conversation(&self, user_id: &str) -> Result<bool> {
        Ok(self.get_paused_conversation(user_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadence_core::clock::ManualClock;
    use cadence_core::session::MessageRole;
    use cadence_infrastructure::InMemoryGateway;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    /// Repository that records the order of calls.
    #[derive(Default)]
    struct RecordingRepository {
        rows: Mutex<Vec<PausedConversation>>,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl PausedConversationRepository for RecordingRepository {
        async fn insert(&self, row: &PausedConversation) -> Result<()> {
            self.calls.lock().unwrap().push("insert");
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }

        async fn find_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.user_id == user_id)
                .max_by_key(|r| r.created_at)
                .cloned())
        }

        async fn delete_for_user(&self, user_id: &str) -> Result<usize> {
            self.calls.lock().unwrap().push("delete");
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.user_id != user_id);
            Ok(before - rows.len())
        }

        async fn claim_latest_for_user(&self, user_id: &str) -> Result<Option<PausedConversation>> {
            self.calls.lock().unwrap().push("claim");
            let mut rows = self.rows.lock().unwrap();
            let (claimed, kept): (Vec<_>, Vec<_>) =
                rows.drain(..).partition(|r| r.user_id == user_id);
            *rows = kept;
            Ok(claimed.into_iter().max_by_key(|r| r.created_at))
        }
    }

    fn messages(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| {
                let role = if i % 2 == 0 {
                    MessageRole::User
                } else {
                    MessageRole::Assistant
                };
                Message::new(role, format!("turn {}", i), Utc::now())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pause_then_get_returns_single_row() {
        let gateway = Arc::new(InMemoryGateway::new());
        let service = PausedConversationService::new(gateway.clone());
        let history = messages(3);

        service
            .pause_conversation("user-1", &history, Some("Sleep"))
            .await
            .unwrap();

        let row = service
            .get_paused_conversation("user-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.title, "Sleep");
        assert_eq!(row.decode_messages().unwrap(), history);
        assert_eq!(gateway.paused_row_count("user-1").await, 1);
    }

    #[tokio::test]
    async fn test_pause_replaces_previous_row() {
        let gateway = Arc::new(InMemoryGateway::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = PausedConversationService::with_clock(gateway.clone(), clock.clone());

        service
            .pause_conversation("user-1", &messages(1), None)
            .await
            .unwrap();
        clock.advance(Duration::minutes(3));
        service
            .pause_conversation("user-1", &messages(4), None)
            .await
            .unwrap();

        assert_eq!(gateway.paused_row_count("user-1").await, 1);
        let row = service
            .get_paused_conversation("user-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.decode_messages().unwrap().len(), 4);
        assert_eq!(row.title, "Paused Conversation");
    }

    #[tokio::test]
    async fn test_pause_deletes_before_insert() {
        let repository = Arc::new(RecordingRepository::default());
        let service = PausedConversationService::new(repository.clone());

        service
            .pause_conversation("user-1", &messages(2), None)
            .await
            .unwrap();

        assert_eq!(*repository.calls.lock().unwrap(), vec!["delete", "insert"]);
    }

    #[tokio::test]
    async fn test_continue_is_one_shot() {
        let repository = Arc::new(RecordingRepository::default());
        let service = PausedConversationService::new(repository.clone());
        let history = messages(2);
        service
            .pause_conversation("user-1", &history, None)
            .await
            .unwrap();

        let first = service.continue_paused_conversation("user-1").await.unwrap();
        let second = service.continue_paused_conversation("user-1").await.unwrap();

        assert_eq!(first, Some(history));
        assert_eq!(second, None);
        assert!(!service.has_paused_conversation("user-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_continue_claims_once() {
        let gateway = Arc::new(InMemoryGateway::new());
        let service = Arc::new(PausedConversationService::new(gateway.clone()));
        service
            .pause_conversation("user-1", &messages(2), None)
            .await
            .unwrap();

        let a = {
            let service = service.clone();
            tokio::spawn(async move { service.continue_paused_conversation("user-1").await })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move { service.continue_paused_conversation("user-1").await })
        };
        let results = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 1);
    }

    #[tokio::test]
    async fn test_clear_leaves_other_users() {
        let gateway = Arc::new(InMemoryGateway::new());
        let service = PausedConversationService::new(gateway.clone());
        service
            .pause_conversation("user-1", &messages(1), None)
            .await
            .unwrap();
        service
            .pause_conversation("user-2", &messages(1), None)
            .await
            .unwrap();

        service.clear_paused_conversation("user-1").await.unwrap();

        assert!(!service.has_paused_conversation("user-1").await.unwrap());
        assert!(service.has_paused_conversation("user-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_offline_pause_is_an_error() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.set_offline(true);
        let service = PausedConversationService::new(gateway.clone());

        let err = service
            .pause_conversation("user-1", &messages(1), None)
            .await
            .unwrap_err();
        assert!(err.is_gateway());
    }
}
