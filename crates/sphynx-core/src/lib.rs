//! # sphynx-core
//!
//! The execution core of Sphynx, an in-memory graph computation engine.
//!
//! A caller names an operation, binds its inputs and outputs to GUIDs, and
//! the engine runs it against entities held in memory. Results become new
//! GUID-addressed entities that can later be persisted to, and recalled
//! from, an ordered on-disk area.
//!
//! ## Layers
//!
//! - `entity` / `formats`: the closed entity model and its binary encoding
//! - `store` / `storage`: the memory tier and the two disk areas
//! - `registry` / `accessor`: the operation contract and its sandbox
//! - `engine`: request-level dispatch, idSet derivation, output merge
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Nothing is loaded from disk implicitly; promotion is an explicit call
//! - Stored entities are immutable; recomputing a GUID replaces it

// =============================================================================
// MODULES
// =============================================================================

pub mod accessor;
pub mod descriptor;
pub mod engine;
pub mod entity;
pub mod formats;
pub mod ops;
pub mod primitives;
pub mod registry;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EntityKind, Guid, SphynxError};

// =============================================================================
// RE-EXPORTS: Entity Model
// =============================================================================

pub use entity::{
    Attribute, EdgeBundle, Entity, Scalar, Tuple2Attribute, VectorAttribute, VertexSet,
};

// =============================================================================
// RE-EXPORTS: Execution
// =============================================================================

pub use accessor::EntityAccessor;
pub use descriptor::{OperationDescriptor, OperationSpec};
pub use engine::{Engine, PersistList};
pub use registry::{Operation, OperationRegistry, OperationsConfig, RegistryBuilder};
pub use store::EntityStore;

// =============================================================================
// RE-EXPORTS: Formats and Storage
// =============================================================================

pub use formats::{EntityHeader, decode, encode, peek_kind};
pub use storage::{OrderedDisk, UnorderedDisk};
