//! Outbound adapters: shelf storage, executors, activator client.

pub mod activator;
pub mod executor;
pub mod shelf;
