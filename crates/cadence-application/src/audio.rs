//! Explicit audio session.
//!
//! The host root owns one [`AudioSession`] and hands it (by `Arc`) to whatever
//! plays audio and to the session manager, which silences everything when a
//! session is paused, completed or ended.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Something that can be told to stop playing.
pub trait AudioHandle: Send + Sync {
    fn stop(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandleId(u64);

#[derive(Default)]
pub struct AudioSession {
    handles: Mutex<HashMap<AudioHandleId, Arc<dyn AudioHandle>>>,
    next_id: AtomicU64,
}

impl AudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: Arc<dyn AudioHandle>) -> AudioHandleId {
        let id = AudioHandleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, handle);
        id
    }

    pub fn unregister(&self, id: AudioHandleId) -> bool {
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some()
    }

    /// Stops every registered handle and returns how many were stopped.
    pub fn stop_all(&self) -> usize {
        let handles: Vec<Arc<dyn AudioHandle>> = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        for handle in &handles {
            handle.stop();
        }
        if !handles.is_empty() {
            tracing::debug!("[AudioSession] Stopped {} audio handle(s)", handles.len());
        }
        handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
