//! Object identity derived from canonical URIs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::DomainError;

const ID_LEN: usize = 64;

/// Registry key for an activation object.
///
/// The identifier is the SHA-256 of the object's canonical URI rendered as
/// lowercase hex, so every node and the activator compute the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Derive the identifier for a canonical URI.
    ///
    /// Surrounding whitespace is ignored; an empty URI is rejected.
    pub fn for_uri(uri: &str) -> Result<Self, DomainError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(DomainError::EmptyUri);
        }

        Ok(Self(hex::encode(Sha256::digest(uri.as_bytes()))))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(DomainError::InvalidIdentifier(s.to_string()))
        }
    }
}

impl TryFrom<String> for ObjectId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_uri_yields_same_identifier() {
        let a = ObjectId::for_uri("ark:/hello/world/v1").unwrap();
        let b = ObjectId::for_uri("ark:/hello/world/v1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn identifier_is_stable_sha256_hex() {
        // sha256("abc")
        let id = ObjectId::for_uri("abc").unwrap();
        assert_eq!(
            id.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let a = ObjectId::for_uri("  ark:/a/b  ").unwrap();
        let b = ObjectId::for_uri("ark:/a/b").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_uris_yield_different_identifiers() {
        let a = ObjectId::for_uri("ark:/a/b").unwrap();
        let b = ObjectId::for_uri("ark:/a/c").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_uri_is_rejected() {
        assert_eq!(ObjectId::for_uri(""), Err(DomainError::EmptyUri));
        assert_eq!(ObjectId::for_uri(" \t"), Err(DomainError::EmptyUri));
    }

    #[test]
    fn parse_accepts_derived_identifier() {
        let id = ObjectId::for_uri("ark:/a/b").unwrap();
        let parsed: ObjectId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_non_hex_and_wrong_length() {
        assert!("xyz".parse::<ObjectId>().is_err());
        assert!("ABCDEF".repeat(11)[..64].parse::<ObjectId>().is_err());
    }

    #[test]
    fn deserialize_validates_identifier() {
        let bad: Result<ObjectId, _> = serde_json::from_str("\"not-a-hash\"");
        assert!(bad.is_err());
    }
}
