//! Local cache trait.
//!
//! The local cache is a per-device key/value store with three named slots. It
//! holds the last known session snapshot so a reload can restore the session
//! without a round trip to the gateway.

use crate::error::Result;
use async_trait::async_trait;

/// The named slots of the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheSlot {
    /// Serialized active conversation
    SessionSnapshot,
    /// Serialized message log
    Messages,
    /// RFC 3339 last-activity timestamp
    LastActivity,
}

impl CacheSlot {
    pub const ALL: [CacheSlot; 3] = [
        CacheSlot::SessionSnapshot,
        CacheSlot::Messages,
        CacheSlot::LastActivity,
    ];

    /// Storage key for the slot.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SessionSnapshot => "therapy_session",
            Self::Messages => "therapy_messages",
            Self::LastActivity => "therapy_last_activity",
        }
    }
}

/// String-valued storage for the three cache slots.
///
/// Only the session manager of one host writes to a given cache.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Reads a slot. `Ok(None)` when the slot was never written or was cleared.
    async fn get(&self, slot: CacheSlot) -> Result<Option<String>>;

    /// Overwrites a slot.
    async fn set(&self, slot: CacheSlot, value: &str) -> Result<()>;

    /// Clears a slot. Clearing an empty slot is not an error.
    async fn remove(&self, slot: CacheSlot) -> Result<()>;

    /// Clears all slots.
    async fn clear(&self) -> Result<()> {
        for slot in CacheSlot::ALL {
            self.remove(slot).await?;
        }
        Ok(())
    }
}
