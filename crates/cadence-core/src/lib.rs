//! Domain layer of the Cadence session core.
//!
//! Holds the conversation/message models, the in-memory session state, the
//! countdown timer, and the traits the infrastructure crate implements
//! (conversation gateway, pause buffer repository, local cache, auth, clock).

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod paused;
pub mod session;
pub mod timer;

// Re-export common error type
pub use error::CadenceError;
