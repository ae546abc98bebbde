//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! domain logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`node`] - Composition root for runtime wiring

pub mod config;
pub mod node;
