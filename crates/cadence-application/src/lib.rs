//! Application layer of the Cadence session core.
//!
//! Coordinates the domain types from `cadence-core` with the gateway and
//! cache implementations: the session lifecycle, the pause buffer, the
//! timer's tick task and the audio registry.

pub mod audio;
pub mod gate;
pub mod paused_service;
pub mod session;
pub mod timer_driver;

pub use audio::{AudioHandle, AudioSession};
pub use gate::OperationGate;
pub use paused_service::PausedConversationService;
pub use session::SessionManager;
pub use timer_driver::{TimerCallback, TimerDriver, TimerSnapshot};
