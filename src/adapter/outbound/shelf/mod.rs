//! Shelf adapters.

pub mod fs;
pub mod memory;

pub use fs::FsShelf;
pub use memory::MemoryShelf;
