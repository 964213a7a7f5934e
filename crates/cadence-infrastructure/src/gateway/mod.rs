//! Persistence gateway implementations.

mod memory;
mod rest;

pub use memory::InMemoryGateway;
pub use rest::RestGateway;
