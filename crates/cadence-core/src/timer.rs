//! Conversation countdown timer.
//!
//! [`ConversationTimer`] is a pure state machine advanced one second per
//! [`ConversationTimer::tick`]. It reports warning and expiry as returned
//! [`TimerEvent`]s instead of calling out, so whoever drives it can release
//! its lock before running callbacks.
//!
//! ```text
//! Idle --start--> Running --tick(max)--> Expired
//!                  |   ^
//!            pause |   | start
//!                  v   |
//!                 Paused
//! ```
//!
//! "Warned" is a flag within a run, not a separate state.

use crate::config::TimerSettings;

/// Durations the timer runs with, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub max_duration_secs: u64,
    /// The warning fires this long before the (possibly extended) maximum.
    pub warning_lead_secs: u64,
    pub extension_secs: u64,
}

impl TimerConfig {
    /// A timer of `max_duration_minutes`, warning one minute before expiry and
    /// extending by five minutes.
    pub fn new(max_duration_minutes: u32) -> Self {
        Self {
            max_duration_secs: u64::from(max_duration_minutes) * 60,
            warning_lead_secs: 60,
            extension_secs: 5 * 60,
        }
    }

    /// Places the warning at an absolute minute of the initial run.
    pub fn with_warning_at_minutes(mut self, warning_at_minutes: u32) -> Self {
        self.warning_lead_secs = self
            .max_duration_secs
            .saturating_sub(u64::from(warning_at_minutes) * 60);
        self
    }

    pub fn with_warning_before_minutes(mut self, minutes: u32) -> Self {
        self.warning_lead_secs = u64::from(minutes) * 60;
        self
    }

    pub fn with_extension_minutes(mut self, minutes: u32) -> Self {
        self.extension_secs = u64::from(minutes) * 60;
        self
    }
}

impl From<&TimerSettings> for TimerConfig {
    fn from(settings: &TimerSettings) -> Self {
        TimerConfig::new(settings.max_duration_minutes)
            .with_warning_before_minutes(settings.warning_before_minutes)
            .with_extension_minutes(settings.extension_minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The warning threshold was crossed.
    Warning { remaining_secs: u64 },
    /// The maximum was reached, or the session was stopped by hand.
    Expired { elapsed_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct ConversationTimer {
    config: TimerConfig,
    state: TimerState,
    elapsed_secs: u64,
    max_duration_secs: u64,
    has_warned: bool,
    extension_count: u32,
}

impl ConversationTimer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: TimerState::Idle,
            elapsed_secs: 0,
            max_duration_secs: config.max_duration_secs,
            has_warned: false,
            extension_count: 0,
        }
    }

    /// Starts or restarts ticking.
    ///
    /// An expired timer only restarts if an extension left time on the clock.
    pub fn start(&mut self) {
        match self.state {
            TimerState::Idle | TimerState::Paused => self.state = TimerState::Running,
            TimerState::Expired if self.elapsed_secs < self.max_duration_secs => {
                self.state = TimerState::Running
            }
            TimerState::Expired | TimerState::Running => {}
        }
    }

    /// Stops ticking and keeps the elapsed time.
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Back to idle with zero elapsed time and the configured maximum.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Adds the extension increment to the maximum and re-arms the warning.
    pub fn extend_session(&mut self) {
        self.max_duration_secs += self.config.extension_secs;
        self.extension_count += 1;
        self.has_warned = false;
    }

    /// Force-stops the timer and reports expiry, unless it already expired.
    pub fn stop_session(&mut self) -> Option<TimerEvent> {
        if self.state == TimerState::Expired {
            return None;
        }
        self.state = TimerState::Expired;
        Some(TimerEvent::Expired {
            elapsed_secs: self.elapsed_secs,
        })
    }

    /// Advances one second if running.
    ///
    /// At most one warning and one expiry are reported per run; once expired,
    /// ticks change nothing.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.state != TimerState::Running {
            return events;
        }

        self.elapsed_secs += 1;

        if !self.has_warned && self.elapsed_secs >= self.warning_threshold_secs() {
            self.has_warned = true;
            events.push(TimerEvent::Warning {
                remaining_secs: self.remaining_seconds(),
            });
        }

        if self.elapsed_secs >= self.max_duration_secs {
            self.state = TimerState::Expired;
            events.push(TimerEvent::Expired {
                elapsed_secs: self.elapsed_secs,
            });
        }

        events
    }

    fn warning_threshold_secs(&self) -> u64 {
        self.max_duration_secs
            .saturating_sub(self.config.warning_lead_secs)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn has_warned(&self) -> bool {
        self.has_warned
    }

    pub fn extension_count(&self) -> u32 {
        self.extension_count
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn max_duration_seconds(&self) -> u64 {
        self.max_duration_secs
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.max_duration_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_secs / 60
    }

    /// Elapsed share of the maximum, 0.0 to 100.0.
    pub fn progress_percent(&self) -> f64 {
        if self.max_duration_secs == 0 {
            return 100.0;
        }
        let percent = self.elapsed_secs as f64 / self.max_duration_secs as f64 * 100.0;
        percent.min(100.0)
    }
}
