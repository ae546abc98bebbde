//! Runtime-agnostic domain types: identifiers, activation records, node info.

pub mod error;
pub mod id;
pub mod info;
pub mod record;

pub use error::DomainError;
pub use id::ObjectId;
pub use info::NodeInfo;
pub use record::{ActivationRecord, ActivationStatus, Snapshot, SourceDescriptor, SourceKind};
