//! # Formats
//!
//! Serialization formats for entities. File I/O lives in [`crate::storage`].

pub mod persistence;

pub use persistence::{EntityHeader, check_payload_size, decode, encode, peek_kind};
