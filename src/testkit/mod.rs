//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`executor`] - `StubFactory` / `StubExecutor` driven by descriptor fields.
//! - [`activator`] - `RecordingActivator`, an in-process activator double.

pub mod activator;
pub mod executor;
