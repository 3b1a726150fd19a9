//! # Entity Persistence Format
//!
//! Binary encoding of one entity for the ordered disk area.
//!
//! Format: Header (6 bytes) + postcard-serialized variant payload.
//! - 4 bytes: Magic ("SPHX")
//! - 1 byte: Version
//! - 1 byte: Variant tag (`EntityKind::tag`)
//!
//! Each encoding is self-contained: the tag says how to read the payload,
//! no schema lookup is needed. Scalars are encoded as their JSON text.
//!
//! ## Validation
//!
//! Decoding never returns a partial entity. It rejects, before or while
//! reading the payload:
//! - data shorter than the header or larger than `MAX_ENTITY_PAYLOAD_SIZE`
//! - wrong magic bytes, version or an unknown tag
//! - payloads that fail to parse or leave trailing bytes
//! - entities violating structural invariants (`Entity::validate`)

use crate::entity::{Attribute, EdgeBundle, Tuple2Attribute, VectorAttribute, VertexSet};
use crate::primitives::{FORMAT_VERSION, HEADER_SIZE, MAGIC_BYTES, MAX_ENTITY_PAYLOAD_SIZE};
use crate::{Entity, EntityKind, Scalar, SphynxError};
use serde::Serialize;
use serde::de::DeserializeOwned;

// =============================================================================
// ENTITY HEADER
// =============================================================================

/// The header preceding every encoded entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub tag: u8,
}

impl EntityHeader {
    /// Create a header for `kind` with the current format version.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
            tag: kind.tag(),
        }
    }

    /// Validate magic and version, and resolve the variant tag.
    pub fn validate(&self) -> Result<EntityKind, SphynxError> {
        if &self.magic != MAGIC_BYTES {
            return Err(SphynxError::CorruptEntity(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(SphynxError::CorruptEntity(format!(
                "Unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        EntityKind::from_tag(self.tag)
            .ok_or_else(|| SphynxError::CorruptEntity(format!("Unknown variant tag: {}", self.tag)))
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes[5] = self.tag;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SphynxError> {
        if bytes.len() < HEADER_SIZE {
            return Err(SphynxError::CorruptEntity(format!(
                "Data too short: minimum {} bytes required, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
            tag: bytes[5],
        })
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode an entity (header + payload).
///
/// This is a pure transformation - no file I/O.
pub fn encode(entity: &Entity) -> Result<Vec<u8>, SphynxError> {
    let payload = match entity {
        Entity::VertexSet(vs) => encode_payload(vs)?,
        Entity::EdgeBundle(eb) => encode_payload(eb)?,
        Entity::StringAttribute(a) => encode_payload(a)?,
        Entity::DoubleAttribute(a) => encode_payload(a)?,
        Entity::LongAttribute(a) => encode_payload(a)?,
        Entity::DoubleTuple2Attribute(a) => encode_payload(a)?,
        Entity::DoubleVectorAttribute(a) => encode_payload(a)?,
        Entity::Scalar(s) => {
            let text = serde_json::to_string(&s.value)
                .map_err(|e| SphynxError::Serialization(e.to_string()))?;
            encode_payload(&text)?
        }
    };

    let header = EntityHeader::new(entity.kind());
    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SphynxError> {
    postcard::to_stdvec(value).map_err(|e| SphynxError::Serialization(e.to_string()))
}

// =============================================================================
// DECODING
// =============================================================================

/// Read and validate only the header, returning the encoded variant.
pub fn peek_kind(bytes: &[u8]) -> Result<EntityKind, SphynxError> {
    EntityHeader::from_bytes(bytes)?.validate()
}

/// Reject encoded data larger than `MAX_ENTITY_PAYLOAD_SIZE`.
///
/// Callers holding a file should check its length with this before reading it.
pub fn check_payload_size(len: u64) -> Result<(), SphynxError> {
    if len > MAX_ENTITY_PAYLOAD_SIZE {
        return Err(SphynxError::CorruptEntity(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            len, MAX_ENTITY_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Decode an entity from bytes.
///
/// This is a pure transformation - no file I/O.
pub fn decode(bytes: &[u8]) -> Result<Entity, SphynxError> {
    check_payload_size(bytes.len() as u64)?;

    let kind = peek_kind(bytes)?;
    let payload = &bytes[HEADER_SIZE..];

    let entity = match kind {
        EntityKind::VertexSet => Entity::VertexSet(decode_payload::<VertexSet>(payload)?),
        EntityKind::EdgeBundle => Entity::EdgeBundle(decode_payload::<EdgeBundle>(payload)?),
        EntityKind::StringAttribute => {
            Entity::StringAttribute(decode_payload::<Attribute<String>>(payload)?)
        }
        EntityKind::DoubleAttribute => {
            Entity::DoubleAttribute(decode_payload::<Attribute<f64>>(payload)?)
        }
        EntityKind::LongAttribute => {
            Entity::LongAttribute(decode_payload::<Attribute<i64>>(payload)?)
        }
        EntityKind::DoubleTuple2Attribute => {
            Entity::DoubleTuple2Attribute(decode_payload::<Tuple2Attribute<f64>>(payload)?)
        }
        EntityKind::DoubleVectorAttribute => {
            Entity::DoubleVectorAttribute(decode_payload::<VectorAttribute<f64>>(payload)?)
        }
        EntityKind::Scalar => {
            let text = decode_payload::<String>(payload)?;
            let value = serde_json::from_str(&text).map_err(|e| {
                SphynxError::CorruptEntity(format!("Scalar payload is not JSON: {}", e))
            })?;
            Entity::Scalar(Scalar { value })
        }
    };

    entity.validate()?;
    Ok(entity)
}

fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, SphynxError> {
    let (value, rest) = postcard::take_from_bytes::<T>(payload)
        .map_err(|e| SphynxError::CorruptEntity(format!("Failed to decode payload: {}", e)))?;
    if !rest.is_empty() {
        return Err(SphynxError::CorruptEntity(format!(
            "{} trailing bytes after payload",
            rest.len()
        )));
    }
    Ok(value)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entity {
        Entity::DoubleAttribute(
            Attribute::new(vec![20.3, 18.2, 0.0, 2.0], vec![true, true, false, true])
                .expect("attribute"),
        )
    }

    #[test]
    fn header_roundtrip() {
        let header = EntityHeader::new(EntityKind::EdgeBundle);
        let bytes = header.to_bytes();
        let restored = EntityHeader::from_bytes(&bytes).expect("parse header");

        assert_eq!(restored.magic, *MAGIC_BYTES);
        assert_eq!(restored.version, FORMAT_VERSION);
        assert_eq!(restored.validate().expect("valid"), EntityKind::EdgeBundle);
    }

    #[test]
    fn payload_size_limit_is_inclusive() {
        assert!(check_payload_size(MAX_ENTITY_PAYLOAD_SIZE).is_ok());
        assert!(matches!(
            check_payload_size(MAX_ENTITY_PAYLOAD_SIZE + 1),
            Err(SphynxError::CorruptEntity(_))
        ));
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = encode(&sample()).expect("encode");
        let second = encode(&sample()).expect("encode");
        assert_eq!(first, second);
        assert_eq!(peek_kind(&first).expect("kind"), EntityKind::DoubleAttribute);
    }

    #[test]
    fn rejects_short_data() {
        let result = decode(b"SPH");
        assert!(matches!(result, Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = encode(&sample()).expect("encode");
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn rejects_wrong_version() {
        let mut bytes = encode(&sample()).expect("encode");
        bytes[4] = FORMAT_VERSION + 1;
        assert!(matches!(decode(&bytes), Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn rejects_unknown_tag() {
        let mut bytes = encode(&sample()).expect("encode");
        bytes[5] = 0xEE;
        assert!(matches!(decode(&bytes), Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn rejects_truncated_payload() {
        let bytes = encode(&sample()).expect("encode");
        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(decode(truncated), Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = encode(&sample()).expect("encode");
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn rejects_misaligned_definedness() {
        // Hand-built payload: 2 values, 1 defined flag.
        let broken = Attribute::<i64> {
            values: vec![1, 2],
            defined: vec![true],
        };
        let mut bytes = EntityHeader::new(EntityKind::LongAttribute).to_bytes().to_vec();
        bytes.extend(postcard::to_stdvec(&broken).expect("payload"));
        assert!(matches!(decode(&bytes), Err(SphynxError::CorruptEntity(_))));
    }

    #[test]
    fn tag_mismatch_reads_as_different_layout() {
        // A vertex-set payload relabelled as a scalar must not decode silently.
        let mut bytes = encode(&Entity::VertexSet(VertexSet::new(vec![1, 2, 3]))).expect("encode");
        bytes[5] = EntityKind::Scalar.tag();
        assert!(decode(&bytes).is_err());
    }
}
