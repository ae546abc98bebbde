//! Activator adapters.

pub mod client;

pub use client::ActivatorClient;
