//! # Storage Module
//!
//! Disk areas used by the engine:
//! - `OrderedDisk`: canonical binary persistence, one directory per GUID
//! - `UnorderedDisk`: JSON staging for external helper processes

pub mod ordered_disk;
pub mod unordered_disk;

pub use ordered_disk::OrderedDisk;
pub use unordered_disk::UnorderedDisk;
