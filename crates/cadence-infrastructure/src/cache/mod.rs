//! Local cache implementations.

mod file;
mod memory;

pub use file::FileLocalCache;
pub use memory::MemoryLocalCache;
