//! Infrastructure configuration modules.

pub mod activator;
pub mod logging;
pub mod settings;
