//! Session domain module.
//!
//! This module contains the conversation and message models, the in-memory
//! session state, and the gateway trait for the remote conversation tables.
//!
//! # Module Structure
//!
//! - `model`: Conversation model (`Conversation`, `ConversationStatus`, `ConversationPatch`)
//! - `message`: Message types (`Message`, `MessageRole`, `MessageRow`)
//! - `state`: In-memory session state (`SessionState`, `SessionSnapshot`)
//! - `repository`: Gateway trait for conversations and messages

mod message;
mod model;
mod repository;
mod state;

pub use message::{Message, MessageRole, MessageRow};
pub use model::{Conversation, ConversationPatch, ConversationStatus};
pub use repository::ConversationGateway;
pub use state::{SessionSnapshot, SessionState};
