//! Adapters implementing the ports, plus the command-line entry points.

pub mod inbound;
pub mod outbound;
