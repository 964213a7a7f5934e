//! Infrastructure for the Cadence session core: gateway adapters, local
//! caches, configuration loading and logging bootstrap.

pub mod cache;
pub mod config_service;
pub mod gateway;
pub mod logging;
pub mod paths;

pub use crate::cache::{FileLocalCache, MemoryLocalCache};
pub use crate::config_service::ConfigService;
pub use crate::gateway::{InMemoryGateway, RestGateway};
