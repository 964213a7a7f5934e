//! In-memory local cache.

use async_trait::async_trait;
use cadence_core::cache::{CacheSlot, LocalCache};
use cadence_core::error::Result;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Local cache kept in process memory, for hosts without durable storage
/// and for tests.
#[derive(Debug, Default)]
pub struct MemoryLocalCache {
    slots: Mutex<HashMap<CacheSlot, String>>,
    writes: Mutex<usize>,
}

impl MemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls served so far.
    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}

#[async_trait]
impl LocalCache for MemoryLocalCache {
    async fn get(&self, slot: CacheSlot) -> Result<Option<String>> {
        Ok(self.slots.lock().await.get(&slot).cloned())
    }

    async fn set(&self, slot: CacheSlot, value: &str) -> Result<()> {
        self.slots.lock().await.insert(slot, value.to_string());
        *self.writes.lock().await += 1;
        Ok(())
    }

    async fn remove(&self, slot: CacheSlot) -> Result<()> {
        self.slots.lock().await.remove(&slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_writes() {
        let cache = MemoryLocalCache::new();
        cache.set(CacheSlot::SessionSnapshot, "{}").await.unwrap();
        cache.set(CacheSlot::SessionSnapshot, "{}").await.unwrap();
        assert_eq!(cache.write_count().await, 2);

        cache.clear().await.unwrap();
        assert!(cache.is_empty().await);
    }
}
