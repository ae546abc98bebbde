//! Outbound ports: storage, executors and the activator.

pub mod activator;
pub mod executor;
pub mod shelf;

pub use activator::{Activator, EnvironmentAnnouncement};
pub use executor::{Executor, ExecutorFactory, SharedExecutor};
pub use shelf::{ShelfMetadata, ShelfStore};
