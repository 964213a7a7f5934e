//! The session snapshot as stored in the local cache's three slots.

use cadence_core::cache::{CacheSlot, LocalCache};
use cadence_core::error::Result;
use cadence_core::session::{Conversation, Message};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct LocalSnapshot {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl LocalSnapshot {
    /// Writes the three slots.
    pub async fn write(&self, cache: &dyn LocalCache) -> Result<()> {
        cache
            .set(
                CacheSlot::SessionSnapshot,
                &serde_json::to_string(&self.conversation)?,
            )
            .await?;
        cache
            .set(CacheSlot::Messages, &serde_json::to_string(&self.messages)?)
            .await?;
        if let Some(last_activity) = self.last_activity {
            cache
                .set(CacheSlot::LastActivity, &last_activity.to_rfc3339())
                .await?;
        }
        Ok(())
    }

    /// Reads the three slots.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: No session snapshot cached
    /// - `Ok(Some(_))`: Snapshot restored; a missing message slot reads as an empty log
    /// - `Err(_)`: A slot holds something that does not parse
    pub async fn read(cache: &dyn LocalCache) -> Result<Option<Self>> {
        let Some(raw_conversation) = cache.get(CacheSlot::SessionSnapshot).await? else {
            return Ok(None);
        };
        let conversation: Conversation = serde_json::from_str(&raw_conversation)?;

        let messages = match cache.get(CacheSlot::Messages).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        let last_activity = match cache.get(CacheSlot::LastActivity).await? {
            Some(raw) => Some(DateTime::parse_from_rfc3339(raw.trim())?.with_timezone(&Utc)),
            None => None,
        };

        Ok(Some(Self {
            conversation,
            messages,
            last_activity,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::session::MessageRole;
    use cadence_infrastructure::MemoryLocalCache;

    #[tokio::test]
    async fn test_write_then_read() {
        let cache = MemoryLocalCache::new();
        let now = Utc::now();
        let snapshot = LocalSnapshot {
            conversation: Conversation::new("Morning", 20, now),
            messages: vec![Message::new(MessageRole::User, "hi", now)],
            last_activity: Some(now),
        };

        snapshot.write(&cache).await.unwrap();
        let read = LocalSnapshot::read(&cache).await.unwrap().unwrap();
        assert_eq!(read, snapshot);
    }

    #[tokio::test]
    async fn test_empty_cache_reads_none() {
        let cache = MemoryLocalCache::new();
        assert!(LocalSnapshot::read(&cache).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_an_error() {
        let cache = MemoryLocalCache::new();
        let conversation = Conversation::new("Morning", 20, Utc::now());
        cache
            .set(
                CacheSlot::SessionSnapshot,
                &serde_json::to_string(&conversation).unwrap(),
            )
            .await
            .unwrap();
        cache.set(CacheSlot::Messages, "[{\"id\":").await.unwrap();

        assert!(LocalSnapshot::read(&cache).await.is_err());
    }
}
