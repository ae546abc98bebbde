//! Port definitions.
//!
//! Traits at the seams between the registry core and its collaborators.
//! Adapters under [`crate::adapter`] implement them.

pub mod outbound;
