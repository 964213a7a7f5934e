//! Debounced local cache writes.
//!
//! [`PersistScheduler`] owns a single writer task. `schedule` hands it the
//! latest snapshot; the task writes only after the quiet period elapses with
//! no newer snapshot, so a burst of streamed messages costs one write. Because
//! every cache write and clear goes through that one task, a clear can never
//! be overtaken by a stale debounced write.

use super::local_snapshot::LocalSnapshot;
use cadence_core::CadenceError;
use cadence_core::cache::LocalCache;
use cadence_core::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum PersistCommand {
    Schedule(Box<LocalSnapshot>),
    Flush(oneshot::Sender<Result<bool>>),
    Cancel,
    Clear(oneshot::Sender<Result<()>>),
}

pub struct PersistScheduler {
    commands: mpsc::UnboundedSender<PersistCommand>,
    worker: JoinHandle<()>,
}

impl PersistScheduler {
    /// Spawns the writer task on the current tokio runtime.
    pub fn spawn(cache: Arc<dyn LocalCache>, delay: Duration) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_writer(cache, delay, receiver));
        Self { commands, worker }
    }

    /// Replaces the pending snapshot and restarts the quiet period.
    pub fn schedule(&self, snapshot: LocalSnapshot) {
        if self
            .commands
            .send(PersistCommand::Schedule(Box::new(snapshot)))
            .is_err()
        {
            tracing::warn!("[PersistScheduler] Writer stopped, dropping snapshot");
        }
    }

    /// Writes the pending snapshot now.
    ///
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn flush(&self) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.request(PersistCommand::Flush(reply))?;
        response
            .await
            .map_err(|_| CadenceError::internal("persist writer dropped flush reply"))?
    }

    /// Drops the pending snapshot without writing it.
    pub fn cancel(&self) {
        let _ = self.commands.send(PersistCommand::Cancel);
    }

    /// Drops the pending snapshot and clears every cache slot.
    pub async fn clear(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.request(PersistCommand::Clear(reply))?;
        response
            .await
            .map_err(|_| CadenceError::internal("persist writer dropped clear reply"))?
    }

    fn request(&self, command: PersistCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CadenceError::internal("persist writer stopped"))
    }
}

impl Drop for PersistScheduler {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_writer(
    cache: Arc<dyn LocalCache>,
    delay: Duration,
    mut commands: mpsc::UnboundedReceiver<PersistCommand>,
) {
    let mut pending: Option<Box<LocalSnapshot>> = None;

    loop {
        let command = if pending.is_some() {
            tokio::select! {
                command = commands.recv() => command,
                _ = tokio::time::sleep(delay) => {
                    if let Some(snapshot) = pending.take() {
                        write_logged(cache.as_ref(), &snapshot).await;
                    }
                    continue;
                }
            }
        } else {
            commands.recv().await
        };

        let Some(command) = command else {
            break;
        };

        match command {
            PersistCommand::Schedule(snapshot) => pending = Some(snapshot),
            PersistCommand::Flush(reply) => {
                let result = match pending.take() {
                    Some(snapshot) => snapshot.write(cache.as_ref()).await.map(|_| true),
                    None => Ok(false),
                };
                let _ = reply.send(result);
            }
            PersistCommand::Cancel => pending = None,
            PersistCommand::Clear(reply) => {
                pending = None;
                let _ = reply.send(cache.clear().await);
            }
        }
    }

    if let Some(snapshot) = pending.take() {
        write_logged(cache.as_ref(), &snapshot).await;
    }
}

async fn write_logged(cache: &dyn LocalCache, snapshot: &LocalSnapshot) {
    match snapshot.write(cache).await {
        Ok(()) => tracing::debug!(
            "[PersistScheduler] Cached conversation {} ({} messages)",
            snapshot.conversation.id,
            snapshot.messages.len()
        ),
        Err(e) => tracing::warn!("[PersistScheduler] Failed to write local cache: {}", e),
    }
}
