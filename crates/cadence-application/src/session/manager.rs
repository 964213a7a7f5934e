//! Session lifecycle.
//!
//! `SessionManager` owns the in-memory [`SessionState`] and coordinates the
//! three places a session lives: memory, the local cache (debounced through
//! [`PersistScheduler`]) and the remote gateway (written through on pause and
//! completion).
//!
//! The state lock is never held across a gateway call. Pause and completion
//! share one [`OperationGate`], so while either is in flight a second call
//! returns `false` without touching the gateway.

use super::local_snapshot::LocalSnapshot;
use super::persist::PersistScheduler;
use crate::audio::AudioSession;
use crate::gate::OperationGate;
use crate::paused_service::PausedConversationService;
use cadence_core::auth::AuthProvider;
use cadence_core::cache::LocalCache;
use cadence_core::clock::{Clock, SystemClock, elapsed_minutes_ceil};
use cadence_core::config::SessionSettings;
use cadence_core::error::Result;
use cadence_core::paused::PausedConversationRepository;
use cadence_core::session::{
    Conversation, ConversationGateway, ConversationPatch, ConversationStatus, Message,
    SessionSnapshot, SessionState,
};
use serde_json::{Map, json};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct SessionManager {
    state: Mutex<SessionState>,
    gateway: Arc<dyn ConversationGateway>,
    paused: PausedConversationService,
    cache: Arc<dyn LocalCache>,
    auth: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
    persist: PersistScheduler,
    gate: OperationGate,
    sync_throttle: Duration,
    last_sync: StdMutex<Option<Instant>>,
    audio: Option<Arc<AudioSession>>,
}

impl SessionManager {
    /// Creates a manager reading the system clock.
    ///
    /// Must be called inside a tokio runtime: the debounced cache writer is
    /// spawned here.
    pub fn new(
        gateway: Arc<dyn ConversationGateway>,
        paused_repository: Arc<dyn PausedConversationRepository>,
        cache: Arc<dyn LocalCache>,
        auth: Arc<dyn AuthProvider>,
        settings: &SessionSettings,
    ) -> Self {
        Self::with_clock(
            gateway,
            paused_repository,
            cache,
            auth,
            Arc::new(SystemClock),
            settings,
        )
    }

    pub fn with_clock(
        gateway: Arc<dyn ConversationGateway>,
        paused_repository: Arc<dyn PausedConversationRepository>,
        cache: Arc<dyn LocalCache>,
        auth: Arc<dyn AuthProvider>,
        clock: Arc<dyn Clock>,
        settings: &SessionSettings,
    ) -> Self {
        let persist = PersistScheduler::spawn(
            Arc::clone(&cache),
            Duration::from_millis(settings.debounce_ms),
        );
        Self {
            state: Mutex::new(SessionState::empty(clock.now())),
            gateway,
            paused: PausedConversationService::with_clock(paused_repository, Arc::clone(&clock)),
            cache,
            auth,
            clock,
            persist,
            gate: OperationGate::new(),
            sync_throttle: Duration::from_secs(settings.sync_throttle_secs),
            last_sync: StdMutex::new(None),
            audio: None,
        }
    }

    /// Attaches the audio session silenced on pause, completion and end.
    pub fn with_audio_session(mut self, audio: Arc<AudioSession>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn paused_conversations(&self) -> &PausedConversationService {
        &self.paused
    }

    /// Makes `conversation` the active session with an empty log.
    pub async fn start_new_session(&self, conversation: Conversation) {
        let mut state = self.state.lock().await;
        tracing::info!(
            "[SessionManager] Starting session {} ('{}')",
            conversation.id,
            conversation.title
        );
        state.start(conversation, self.clock.now());
        self.schedule_persist(&state);
    }

    /// Loads `conversation` with a copy of `messages`, keeping its status.
    pub async fn resume_session(&self, conversation: Conversation, messages: &[Message]) {
        let mut state = self.state.lock().await;
        tracing::info!(
            "[SessionManager] Resuming session {} ({}, {} messages)",
            conversation.id,
            conversation.status.as_str(),
            messages.len()
        );
        state.resume(conversation, messages, self.clock.now());
        self.schedule_persist(&state);
    }

    /// Appends `message` to the log. Returns `false` if its id is already there.
    pub async fn add_message_to_session(&self, message: Message) -> bool {
        let mut state = self.state.lock().await;
        let id = message.id.clone();
        if !state.add_message(message, self.clock.now()) {
            tracing::warn!("[SessionManager] Ignoring duplicate message {}", id);
            return false;
        }
        self.schedule_persist(&state);
        true
    }

    /// Pauses the loaded conversation remotely and stores it in the pause buffer.
    ///
    /// Returns `false` without side effects when no conversation is loaded, no
    /// user is signed in, or another pause/complete is in flight. A gateway
    /// failure also returns `false`; in-memory state only changes on success.
    pub async fn pause_session(&self) -> bool {
        let Some(_guard) = self.gate.try_begin() else {
            tracing::warn!("[SessionManager] Pause ignored: another operation is in flight");
            return false;
        };

        let Some((conversation, messages)) = self.loaded_session().await else {
            tracing::warn!("[SessionManager] Pause ignored: no session loaded");
            return false;
        };
        let Some(user_id) = self.auth.current_user_id().await else {
            tracing::warn!("[SessionManager] Pause ignored: no signed-in user");
            return false;
        };

        let now = self.clock.now();
        let mut entries = Map::new();
        entries.insert("paused_at".to_string(), json!(now.to_rfc3339()));
        entries.insert("message_count".to_string(), json!(messages.len()));
        let patch = ConversationPatch::status(ConversationStatus::Paused)
            .with_session_data(conversation.merged_session_data(entries));

        if let Err(e) = self
            .gateway
            .update_conversation(&conversation.id, &patch)
            .await
        {
            tracing::error!(
                "[SessionManager] Failed to mark conversation {} paused: {}",
                conversation.id,
                e
            );
            return false;
        }

        if let Err(e) = self
            .paused
            .pause_conversation(&user_id, &messages, Some(&conversation.title))
            .await
        {
            tracing::error!(
                "[SessionManager] Failed to store paused conversation {}: {}",
                conversation.id,
                e
            );
            return false;
        }

        {
            let mut state = self.state.lock().await;
            // Another session may have been started meanwhile.
            let still_loaded = state
                .conversation()
                .is_some_and(|current| current.id == conversation.id);
            if still_loaded {
                if let Some(current) = state.conversation_mut() {
                    current.apply(&patch);
                }
                self.schedule_persist(&state);
            }
        }
        self.stop_audio();

        tracing::info!(
            "[SessionManager] Paused session {} ({} messages)",
            conversation.id,
            messages.len()
        );
        true
    }

    /// Flips a paused session back to active, in memory only.
    pub async fn resume_paused_session(&self) {
        let mut state = self.state.lock().await;
        if !state.set_status(ConversationStatus::Active) {
            tracing::debug!("[SessionManager] Nothing to resume");
            return;
        }
        state.touch(self.clock.now());
        self.schedule_persist(&state);
    }

    /// Marks the loaded conversation completed and tears the session down.
    ///
    /// The recorded duration is the elapsed time since `started_at`, rounded up
    /// to whole minutes. On success the user's pause buffer is cleared, and the
    /// in-memory state and local cache are reset unless another session was
    /// started while the gateway calls were in flight.
    pub async fn complete_session(&self) -> bool {
        let Some(_guard) = self.gate.try_begin() else {
            tracing::warn!("[SessionManager] Complete ignored: another operation is in flight");
            return false;
        };

        let Some((conversation, messages)) = self.loaded_session().await else {
            tracing::warn!("[SessionManager] Complete ignored: no session loaded");
            return false;
        };
        let Some(user_id) = self.auth.current_user_id().await else {
            tracing::warn!("[SessionManager] Complete ignored: no signed-in user");
            return false;
        };

        let now = self.clock.now();
        let duration_minutes = elapsed_minutes_ceil(conversation.started_at, now);
        let mut entries = Map::new();
        entries.insert("completed_at".to_string(), json!(now.to_rfc3339()));
        entries.insert("message_count".to_string(), json!(messages.len()));
        let patch = ConversationPatch::status(ConversationStatus::Completed)
            .with_duration_minutes(duration_minutes)
            .with_session_data(conversation.merged_session_data(entries));

        if let Err(e) = self
            .gateway
            .update_conversation(&conversation.id, &patch)
            .await
        {
            tracing::error!(
                "[SessionManager] Failed to mark conversation {} completed: {}",
                conversation.id,
                e
            );
            return false;
        }

        if let Err(e) = self.paused.clear_paused_conversation(&user_id).await {
            tracing::error!(
                "[SessionManager] Failed to clear pause buffer for user {}: {}",
                user_id,
                e
            );
            return false;
        }

        let still_loaded = {
            let mut state = self.state.lock().await;
            // Another session may have been started meanwhile; leave it alone.
            let still_loaded = state
                .conversation()
                .is_some_and(|current| current.id == conversation.id);
            if still_loaded {
                state.reset(self.clock.now());
                self.clear_local(&state).await;
            }
            still_loaded
        };
        if still_loaded {
            self.stop_audio();
        } else {
            tracing::debug!(
                "[SessionManager] Session {} was replaced before completion finished",
                conversation.id
            );
        }

        tracing::info!(
            "[SessionManager] Completed session {} after {} minute(s)",
            conversation.id,
            duration_minutes
        );
        true
    }

    /// Drops the session locally. The gateway is not touched.
    pub async fn end_session(&self) {
        let mut state = self.state.lock().await;
        if let Some(conversation) = state.conversation() {
            tracing::info!("[SessionManager] Ending session {}", conversation.id);
        }
        state.reset(self.clock.now());
        self.clear_local(&state).await;
        drop(state);
        self.stop_audio();
    }

    pub async fn update_activity(&self) {
        self.state.lock().await.touch(self.clock.now());
    }

    /// Restores the session from the local cache.
    ///
    /// Returns `false` when nothing is cached or the cached entries do not
    /// parse; the latter is logged and otherwise treated as an empty cache.
    pub async fn load_session_from_local(&self) -> bool {
        let snapshot = match LocalSnapshot::read(self.cache.as_ref()).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!("[SessionManager] No cached session");
                return false;
            }
            Err(e) => {
                tracing::warn!("[SessionManager] Ignoring unreadable cached session: {}", e);
                return false;
            }
        };

        let mut state = self.state.lock().await;
        // A snapshot scheduled before the restore would overwrite it.
        self.persist.cancel();
        tracing::info!(
            "[SessionManager] Restored session {} from cache ({} messages)",
            snapshot.conversation.id,
            snapshot.messages.len()
        );
        let last_activity = snapshot.last_activity.unwrap_or_else(|| self.clock.now());
        state.replace(snapshot.conversation, snapshot.messages, last_activity);
        true
    }

    /// Replaces the local state with the gateway's copy of a conversation.
    ///
    /// Runs at most once per throttle window; calls inside the window return
    /// `false` immediately. Fetch failures and missing rows are logged and
    /// leave the state as it was.
    pub async fn sync_with_database_state(&self, conversation_id: &str) -> bool {
        if !self.claim_sync_slot() {
            tracing::debug!(
                "[SessionManager] Sync of {} throttled",
                conversation_id
            );
            return false;
        }

        let conversation = match self.gateway.fetch_conversation(conversation_id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => {
                tracing::warn!(
                    "[SessionManager] Sync skipped: conversation {} not found",
                    conversation_id
                );
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    "[SessionManager] Sync of {} failed: {}",
                    conversation_id,
                    e
                );
                return false;
            }
        };

        let messages: Vec<Message> = match self.gateway.fetch_messages(conversation_id).await {
            Ok(rows) => rows.into_iter().map(Message::from).collect(),
            Err(e) => {
                tracing::warn!(
                    "[SessionManager] Sync of {} messages failed: {}",
                    conversation_id,
                    e
                );
                return false;
            }
        };

        let mut state = self.state.lock().await;
        tracing::debug!(
            "[SessionManager] Synced {} ({} messages)",
            conversation_id,
            messages.len()
        );
        let last_activity = state.last_activity();
        state.replace(conversation, messages, last_activity);
        self.schedule_persist(&state);
        true
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Writes the pending cache snapshot now. Returns `false` if none was pending.
    pub async fn flush_pending(&self) -> Result<bool> {
        self.persist.flush().await
    }

    async fn loaded_session(&self) -> Option<(Conversation, Vec<Message>)> {
        let state = self.state.lock().await;
        state
            .conversation()
            .map(|conversation| (conversation.clone(), state.messages().to_vec()))
    }

    fn claim_sync_slot(&self) -> bool {
        let now = Instant::now();
        let mut last_sync = self.last_sync.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = *last_sync {
            if now.duration_since(previous) < self.sync_throttle {
                return false;
            }
        }
        *last_sync = Some(now);
        true
    }

    fn schedule_persist(&self, state: &SessionState) {
        let Some(conversation) = state.conversation() else {
            return;
        };
        self.persist.schedule(LocalSnapshot {
            conversation: conversation.clone(),
            messages: state.messages().to_vec(),
            last_activity: Some(state.last_activity()),
        });
    }

    /// Clears the cache while the caller holds the state lock, so no newer
    /// snapshot can be scheduled in between.
    async fn clear_local(&self, _state: &SessionState) {
        if let Err(e) = self.persist.clear().await {
            tracing::warn!("[SessionManager] Failed to clear local cache: {}", e);
        }
    }

    fn stop_audio(&self) {
        if let Some(audio) = &self.audio {
            let stopped = audio.stop_all();
            if stopped > 0 {
                tracing::debug!("[SessionManager] Stopped {} audio handle(s)", stopped);
            }
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("gate", &self.gate.state())
            .field("sync_throttle", &self.sync_throttle)
            .finish_non_exhaustive()
    }
}

