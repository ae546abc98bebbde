//! Activation records and the persisted registry snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ObjectId;

/// Lifecycle state of an activation object on this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationStatus {
    Activated,
    Deactivated,
}

impl ActivationStatus {
    #[must_use]
    pub const fn is_activated(self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activated => f.pad("Activated"),
            Self::Deactivated => f.pad("Deactivated"),
        }
    }
}

/// Executor variants selectable from a source descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Static payload carried in the descriptor itself.
    Inline,
    /// Executable bundle on the local filesystem.
    Process,
    /// Object served by another HTTP endpoint.
    Remote,
}

impl SourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Process => "process",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "process" | "bundle" => Ok(Self::Process),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown source kind '{other}'")),
        }
    }
}

/// Metadata describing how to build an executor for an object.
///
/// Only `kind` is interpreted by the registry layer. Fields the runtime does
/// not understand are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceDescriptor {
    fn new(kind: SourceKind) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            location: None,
            version: None,
            body: None,
            extra: Map::new(),
        }
    }

    /// Descriptor for an object whose output is carried inline.
    #[must_use]
    pub fn inline(body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(SourceKind::Inline)
        }
    }

    /// Descriptor for an executable bundle at `location`.
    #[must_use]
    pub fn process(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::new(SourceKind::Process)
        }
    }

    /// Descriptor for an object served at `url`.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            location: Some(url.into()),
            ..Self::new(SourceKind::Remote)
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parse the declared kind.
    pub fn source_kind(&self) -> Result<SourceKind, String> {
        self.kind.parse()
    }
}

/// Persisted state of one object. The executor is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub id: ObjectId,
    pub uri: String,
    pub status: ActivationStatus,
    #[serde(alias = "src")]
    pub source: SourceDescriptor,
}

impl ActivationRecord {
    /// A freshly installed, not yet activated record.
    #[must_use]
    pub fn new(id: ObjectId, uri: impl Into<String>, source: SourceDescriptor) -> Self {
        Self {
            id,
            uri: uri.into(),
            status: ActivationStatus::Deactivated,
            source,
        }
    }
}

/// Whole-registry snapshot as stored on the shelf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<ObjectId, ActivationRecord>);

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: ActivationRecord) -> Option<ActivationRecord> {
        self.0.insert(record.id.clone(), record)
    }

    pub fn remove(&mut self, id: &ObjectId) -> Option<ActivationRecord> {
        self.0.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&ActivationRecord> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut ActivationRecord> {
        self.0.get_mut(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &ActivationRecord)> {
        self.0.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &ActivationRecord> {
        self.0.values()
    }

    /// Find the first record whose key, stored id and URI hash disagree.
    ///
    /// Returns `(key, expected, uri)` where `expected` is derived from the URI.
    #[must_use]
    pub fn find_inconsistent(&self) -> Option<(String, ObjectId, String)> {
        self.0.iter().find_map(|(key, record)| {
            let expected = ObjectId::for_uri(&record.uri).ok();
            match expected {
                Some(expected) if &expected == key && expected == record.id => None,
                Some(expected) => Some((key.to_string(), expected, record.uri.clone())),
                // An empty URI can never map back to its key.
                None => Some((key.to_string(), key.clone(), record.uri.clone())),
            }
        })
    }
}

impl FromIterator<ActivationRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = ActivationRecord>>(iter: I) -> Self {
        Self(iter.into_iter().map(|r| (r.id.clone(), r)).collect())
    }
}
