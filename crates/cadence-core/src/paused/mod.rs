//! Pause buffer domain module: one durable paused snapshot per user.

mod model;
mod repository;

pub use model::{DEFAULT_PAUSED_TITLE, PausedConversation};
pub use repository::PausedConversationRepository;
