//! # Core Type Definitions
//!
//! This module contains the identifier and error types shared by every layer
//! of the engine:
//! - Entity identifiers (`Guid`)
//! - Entity variant names (`EntityKind`)
//! - Error types (`SphynxError`)

use crate::primitives::MAX_GUID_LENGTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque identifier of one entity instance.
///
/// GUIDs are assigned by the orchestrating client, never generated here.
/// The same GUID names the entity in memory and on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Wrap a caller-supplied identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that the GUID can be used verbatim as a single directory name.
    ///
    /// Rejects empty identifiers, `.`/`..`, path separators and NUL bytes so
    /// a GUID can never address anything outside its disk area.
    pub fn validate_path_component(&self) -> Result<(), SphynxError> {
        let s = self.0.as_str();
        let unsafe_char = s.chars().any(|c| c == '/' || c == '\\' || c == '\0');
        if s.is_empty() || s == "." || s == ".." || unsafe_char || s.len() > MAX_GUID_LENGTH {
            return Err(SphynxError::InvalidGuid(s.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// The closed set of entity variants, without their payloads.
///
/// Used in error reports, in the disk header tag and wherever a caller
/// states which variant it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    VertexSet,
    EdgeBundle,
    StringAttribute,
    DoubleAttribute,
    LongAttribute,
    DoubleTuple2Attribute,
    DoubleVectorAttribute,
    Scalar,
}

impl EntityKind {
    /// Every kind, in tag order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::VertexSet,
        EntityKind::EdgeBundle,
        EntityKind::StringAttribute,
        EntityKind::DoubleAttribute,
        EntityKind::LongAttribute,
        EntityKind::DoubleTuple2Attribute,
        EntityKind::DoubleVectorAttribute,
        EntityKind::Scalar,
    ];

    /// Stable one-byte tag used by the ordered-disk header.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            EntityKind::VertexSet => 1,
            EntityKind::EdgeBundle => 2,
            EntityKind::StringAttribute => 3,
            EntityKind::DoubleAttribute => 4,
            EntityKind::LongAttribute => 5,
            EntityKind::DoubleTuple2Attribute => 6,
            EntityKind::DoubleVectorAttribute => 7,
            EntityKind::Scalar => 8,
        }
    }

    /// Inverse of [`EntityKind::tag`].
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Variant name as used in error messages and JSON `kind` fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EntityKind::VertexSet => "VertexSet",
            EntityKind::EdgeBundle => "EdgeBundle",
            EntityKind::StringAttribute => "StringAttribute",
            EntityKind::DoubleAttribute => "DoubleAttribute",
            EntityKind::LongAttribute => "LongAttribute",
            EntityKind::DoubleTuple2Attribute => "DoubleTuple2Attribute",
            EntityKind::DoubleVectorAttribute => "DoubleVectorAttribute",
            EntityKind::Scalar => "Scalar",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Sphynx engine.
///
/// Every variant is reported to the RPC caller; none is fatal to the server.
/// The engine performs no retries.
#[derive(Debug, Error)]
pub enum SphynxError {
    /// The operation class is not in the registry (or lacks the namespace).
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The GUID is not resident in memory.
    #[error("Entity not found: {0}")]
    EntityNotFound(Guid),

    /// A stored or produced entity is not the variant the caller expected.
    #[error("Entity {guid} is {actual}, expected {expected}")]
    TypeMismatch {
        guid: Guid,
        expected: String,
        actual: String,
    },

    /// Encoded or imported entity data violates structural invariants.
    #[error("Corrupt entity: {0}")]
    CorruptEntity(String),

    /// A delegated external computation failed.
    #[error("External process `{command}` failed ({status}): {stderr}")]
    ExternalProcessFailure {
        command: String,
        status: String,
        stderr: String,
    },

    /// The operation descriptor JSON could not be decoded.
    #[error("Invalid operation descriptor: {0}")]
    InvalidDescriptor(String),

    /// An operation parameter is missing or has the wrong type.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// An input or output name is not declared in the descriptor.
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    /// Two operations were registered under the same name.
    #[error("Operation registered twice: {0}")]
    DuplicateOperation(String),

    /// The GUID cannot be used as a disk-area directory name.
    #[error("Invalid guid: {0:?}")]
    InvalidGuid(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SphynxError {
    /// Build a `TypeMismatch` for `guid`.
    pub fn type_mismatch(guid: &Guid, expected: EntityKind, actual: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            guid: guid.clone(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Short variant name, stable across releases; used as the RPC error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedOperation(_) => "UnsupportedOperation",
            Self::EntityNotFound(_) => "EntityNotFound",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::CorruptEntity(_) => "CorruptEntity",
            Self::ExternalProcessFailure { .. } => "ExternalProcessFailure",
            Self::InvalidDescriptor(_) => "InvalidDescriptor",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::UnknownSlot(_) => "UnknownSlot",
            Self::DuplicateOperation(_) => "DuplicateOperation",
            Self::InvalidGuid(_) => "InvalidGuid",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
        }
    }
}

impl From<std::io::Error> for SphynxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_invertible() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EntityKind::from_tag(0), None);
        assert_eq!(EntityKind::from_tag(200), None);
    }

    #[test]
    fn guid_path_component_validation() {
        assert!(Guid::new("0f3c-22aa").validate_path_component().is_ok());
        assert!(Guid::new("név-😀").validate_path_component().is_ok());

        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0byte"] {
            let result = Guid::new(bad).validate_path_component();
            assert!(matches!(result, Err(SphynxError::InvalidGuid(_))), "{bad:?}");
        }
        let long = "x".repeat(MAX_GUID_LENGTH + 1);
        assert!(Guid::new(long).validate_path_component().is_err());
    }

    #[test]
    fn type_mismatch_message_names_both_kinds() {
        let err = SphynxError::type_mismatch(
            &Guid::new("g1"),
            EntityKind::StringAttribute,
            EntityKind::VertexSet,
        );
        let msg = err.to_string();
        assert!(msg.contains("g1"));
        assert!(msg.contains("StringAttribute"));
        assert!(msg.contains("VertexSet"));
        assert_eq!(err.kind(), "TypeMismatch");
    }

    #[test]
    fn guid_serializes_as_plain_string() {
        let json = serde_json::to_string(&Guid::new("abc")).expect("serialize");
        assert_eq!(json, "\"abc\"");
    }
}
