//! Drives a [`ConversationTimer`] from a 1 Hz tokio interval.
//!
//! The tick task locks the timer only long enough to advance it; warning and
//! expiry callbacks run after the lock is released, so a callback may call
//! back into the driver (for example to extend the session).

use cadence_core::timer::{ConversationTimer, TimerConfig, TimerEvent, TimerState};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Callback invoked with a warning or expiry event.
pub type TimerCallback = Arc<dyn Fn(TimerEvent) + Send + Sync>;

/// Read-only view of the timer for the host UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub elapsed_minutes: u64,
    pub progress_percent: f64,
    pub has_warned: bool,
    pub extension_count: u32,
}

pub struct TimerDriver {
    timer: Arc<Mutex<ConversationTimer>>,
    on_warning: TimerCallback,
    on_expire: TimerCallback,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl TimerDriver {
    pub fn new(config: TimerConfig, on_warning: TimerCallback, on_expire: TimerCallback) -> Self {
        Self {
            timer: Arc::new(Mutex::new(ConversationTimer::new(config))),
            on_warning,
            on_expire,
            ticker: Mutex::new(None),
        }
    }

    /// Starts or resumes the countdown. The tick task is spawned on first use.
    pub fn start(&self) {
        lock(&self.timer).start();
        self.ensure_ticker();
    }

    pub fn pause(&self) {
        lock(&self.timer).pause();
    }

    pub fn reset(&self) {
        lock(&self.timer).reset();
    }

    pub fn extend_session(&self) {
        let mut timer = lock(&self.timer);
        timer.extend_session();
        tracing::info!(
            "[TimerDriver] Session extended ({} extension(s), {}s remaining)",
            timer.extension_count(),
            timer.remaining_seconds()
        );
    }

    /// Ends the countdown now, firing the expiry callback unless already expired.
    pub fn stop_session(&self) {
        let event = lock(&self.timer).stop_session();
        if let Some(event) = event {
            (self.on_expire)(event);
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let timer = lock(&self.timer);
        TimerSnapshot {
            state: timer.state(),
            elapsed_seconds: timer.elapsed_seconds(),
            remaining_seconds: timer.remaining_seconds(),
            elapsed_minutes: timer.elapsed_minutes(),
            progress_percent: timer.progress_percent(),
            has_warned: timer.has_warned(),
            extension_count: timer.extension_count(),
        }
    }

    fn ensure_ticker(&self) {
        let mut ticker = lock(&self.ticker);
        if ticker.is_some() {
            return;
        }

        let timer = Arc::clone(&self.timer);
        let on_warning = Arc::clone(&self.on_warning);
        let on_expire = Arc::clone(&self.on_expire);

        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; a second has not passed yet.
            interval.tick().await;
            tracing::debug!(target: "timer", "Tick task started");

            loop {
                interval.tick().await;
                let events = lock(&timer).tick();
                for event in events {
                    match event {
                        TimerEvent::Warning { remaining_secs } => {
                            tracing::info!(target: "timer", "Warning: {}s remaining", remaining_secs);
                            on_warning(event);
                        }
                        TimerEvent::Expired { elapsed_secs } => {
                            tracing::info!(target: "timer", "Expired after {}s", elapsed_secs);
                            on_expire(event);
                        }
                    }
                }
            }
        }));
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
