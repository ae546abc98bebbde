//! Domain validation errors.
//!
//! Returned when a value violates a domain rule, such as an empty URI handed
//! to the identity resolver.
//!
//! ```
//! use kgrid_node::domain::error::DomainError;
//! use kgrid_node::domain::id::ObjectId;
//!
//! assert!(matches!(ObjectId::for_uri("   "), Err(DomainError::EmptyUri)));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identity can only be derived from a non-empty URI.
    #[error("uri cannot be empty")]
    EmptyUri,

    /// Identifiers are 64 lowercase hex characters.
    #[error("invalid object identifier '{0}'")]
    InvalidIdentifier(String),
}
