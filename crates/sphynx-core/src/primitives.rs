//! # Engine Primitives
//!
//! Hardcoded protocol constants for the Sphynx engine.
//!
//! These values are shared with the orchestrating client and with the
//! on-disk format, so they are compiled in and immutable at runtime.

/// Namespace every operation class name must carry.
///
/// The registry is keyed by the remainder after this prefix. A class name
/// without the exact prefix is never matched.
pub const OPERATION_CLASS_PREFIX: &str = "com.lynxanalytics.biggraph.graph_operations.";

/// Output-name suffix marking an edge-bundle identity set.
///
/// An output called `edges-idSet` is derived from the `edges` edge bundle
/// after the operation body returns.
pub const ID_SET_SUFFIX: &str = "-idSet";

/// Magic bytes for the ordered-disk entity header.
pub const MAGIC_BYTES: &[u8; 4] = b"SPHX";

/// Current ordered-disk format version.
///
/// Increment this when making breaking changes to the encoding.
pub const FORMAT_VERSION: u8 = 1;

/// Header size: magic (4) + version (1) + variant tag (1).
pub const HEADER_SIZE: usize = 6;

/// Maximum encoded entity size accepted by the decoder (2 GiB).
///
/// Checked before any payload is deserialized.
pub const MAX_ENTITY_PAYLOAD_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// File holding the encoded entity inside its ordered-area directory.
pub const ORDERED_DATA_FILE: &str = "data.sphx";

/// Marker written after the data file; its presence means "fully on disk".
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// File holding the JSON form of an entity inside its staging directory.
pub const UNORDERED_DATA_FILE: &str = "data.json";

/// Maximum GUID length accepted as a directory name.
pub const MAX_GUID_LENGTH: usize = 255;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"SPHX");
        assert_eq!(HEADER_SIZE, MAGIC_BYTES.len() + 2);
    }

    #[test]
    fn prefix_is_dotted_namespace() {
        assert!(OPERATION_CLASS_PREFIX.ends_with('.'));
    }
}
