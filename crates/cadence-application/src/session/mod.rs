//! Session lifecycle module.
//!
//! - `manager`: `SessionManager`, the entry point the host UI calls
//! - `persist`: Debounced local cache writer (`PersistScheduler`)
//! - `local_snapshot`: The three-slot cache layout (`LocalSnapshot`)

mod local_snapshot;
mod manager;
mod persist;

pub use local_snapshot::LocalSnapshot;
pub use manager::SessionManager;
pub use persist::PersistScheduler;
