//! Application services: the activation registry, execution dispatch and
//! the startup announcement.

pub mod announce;
pub mod dispatch;
pub mod registry;

pub use dispatch::ExecutionDispatcher;
pub use registry::{ActivationRegistry, LoadReport};
