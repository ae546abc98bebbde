//! kgrid-node - a KGrid remote runtime environment.
//!
//! Hosts knowledge objects on behalf of an activator: it keeps an activation
//! registry persisted on a local shelf, rebuilds executors for activated
//! objects at startup, dispatches execution requests to them, and announces
//! itself to the activator.
//!
//! # Architecture
//!
//! - **`domain`** - Identifiers, activation records, snapshots, node info
//! - **`port`** - Traits for the shelf, executors and the activator
//! - **`adapter`** - Filesystem shelf, executor variants, activator HTTP
//!   client and the CLI
//! - **`application`** - Activation registry, execution dispatch and the
//!   startup announcement
//! - **`infrastructure`** - Configuration, logging and runtime wiring
//!
//! # Features
//!
//! - `testkit` - Test doubles for executors and the activator
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kgrid_node::adapter::outbound::executor::DefaultExecutorFactory;
//! use kgrid_node::adapter::outbound::shelf::FsShelf;
//! use kgrid_node::application::ActivationRegistry;
//! use kgrid_node::domain::SourceDescriptor;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let shelf = Arc::new(FsShelf::new("shelf"));
//! let factory = Arc::new(DefaultExecutorFactory::new("shelf", reqwest::Client::new()));
//! let registry = ActivationRegistry::new(shelf, factory);
//!
//! registry.load().await?;
//! let id = registry
//!     .install("ark:/hello/world", SourceDescriptor::inline(json!("hi")))
//!     .await?;
//! registry.activate(&id).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
