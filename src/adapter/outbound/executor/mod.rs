//! Executor variants and the factory that selects between them.
//!
//! - [`inline`] - returns a payload carried in the descriptor
//! - [`process`] - runs a packaged executable, JSON over stdin/stdout
//! - [`remote`] - forwards the input to an HTTP endpoint

pub mod factory;
pub mod inline;
pub mod process;
pub mod remote;

pub use factory::DefaultExecutorFactory;
pub use inline::InlineExecutor;
pub use process::ProcessExecutor;
pub use remote::RemoteExecutor;
