//! # Entity Model
//!
//! The closed set of data variants the engine stores: vertex sets, edge
//! bundles, sparse attributes and scalars.
//!
//! ## Definedness
//!
//! Attributes are sparse. `values` and `defined` are parallel sequences of the
//! same length; a slot whose `defined` flag is false carries a default value
//! that must never be read as meaningful. [`Attribute::get`] and
//! [`Attribute::iter_defined`] only ever hand out defined slots.
//!
//! ## JSON form
//!
//! `Entity` serializes with an internal `kind` tag, e.g.
//! `{"kind":"EdgeBundle","src":[0],"dst":[1],"edge_mapping":[7]}`. This form
//! is used only for the unordered staging area; the ordered disk area uses
//! the binary codec in [`crate::formats`].

use crate::{EntityKind, Guid, SphynxError};
use serde::{Deserialize, Serialize};

// =============================================================================
// VERTEX SET
// =============================================================================

/// A dense local index space `0..n` of graph vertices.
///
/// `mapping_to_unordered[i]` is the external identifier of local vertex `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VertexSet {
    pub mapping_to_unordered: Vec<i64>,
}

impl VertexSet {
    /// Create a vertex set from its external-identifier mapping.
    #[must_use]
    pub fn new(mapping_to_unordered: Vec<i64>) -> Self {
        Self {
            mapping_to_unordered,
        }
    }

    /// Create a vertex set of `n` vertices whose external ids are `0..n`.
    #[must_use]
    pub fn with_len(n: usize) -> Self {
        Self::new((0..n as i64).collect())
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping_to_unordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping_to_unordered.is_empty()
    }
}

// =============================================================================
// EDGE BUNDLE
// =============================================================================

/// Directed multigraph edges between two vertex sets.
///
/// `src[i] -> dst[i]` is local edge `i`; `edge_mapping[i]` is its external
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeBundle {
    pub src: Vec<i64>,
    pub dst: Vec<i64>,
    pub edge_mapping: Vec<i64>,
}

impl EdgeBundle {
    /// Create an edge bundle, checking the parallel sequences line up.
    pub fn new(src: Vec<i64>, dst: Vec<i64>, edge_mapping: Vec<i64>) -> Result<Self, SphynxError> {
        let eb = Self {
            src,
            dst,
            edge_mapping,
        };
        eb.check_shape().map_err(SphynxError::CorruptEntity)?;
        Ok(eb)
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.src.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Iterate `(src, dst)` pairs as local indices.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src
            .iter()
            .zip(&self.dst)
            .map(|(&s, &d)| (s as usize, d as usize))
    }

    /// Check every endpoint lies inside its vertex set.
    pub fn check_bounds(&self, src_vs: &VertexSet, dst_vs: &VertexSet) -> Result<(), SphynxError> {
        let out_of_range = |idx: i64, vs: &VertexSet| idx < 0 || idx as usize >= vs.len();
        for (i, (&s, &d)) in self.src.iter().zip(&self.dst).enumerate() {
            if out_of_range(s, src_vs) || out_of_range(d, dst_vs) {
                return Err(SphynxError::CorruptEntity(format!(
                    "edge {} ({} -> {}) is outside its vertex sets ({} / {} vertices)",
                    i,
                    s,
                    d,
                    src_vs.len(),
                    dst_vs.len()
                )));
            }
        }
        Ok(())
    }

    fn check_shape(&self) -> Result<(), String> {
        if self.src.len() != self.dst.len() || self.src.len() != self.edge_mapping.len() {
            return Err(format!(
                "edge bundle sequences differ in length: src={} dst={} edge_mapping={}",
                self.src.len(),
                self.dst.len(),
                self.edge_mapping.len()
            ));
        }
        if let Some(bad) = self.src.iter().chain(&self.dst).find(|&&i| i < 0) {
            return Err(format!("negative vertex index {} in edge bundle", bad));
        }
        Ok(())
    }
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// A sparse per-vertex or per-edge value sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attribute<T> {
    pub values: Vec<T>,
    pub defined: Vec<bool>,
}

/// Attribute whose values are sequences.
pub type VectorAttribute<T> = Attribute<Vec<T>>;

/// Attribute whose values are fixed pairs.
pub type Tuple2Attribute<T> = Attribute<(T, T)>;

impl<T> Attribute<T> {
    /// Create an attribute, checking `values` and `defined` line up.
    pub fn new(values: Vec<T>, defined: Vec<bool>) -> Result<Self, SphynxError> {
        let attr = Self { values, defined };
        attr.check_shape().map_err(SphynxError::CorruptEntity)?;
        Ok(attr)
    }

    /// Number of slots (defined or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `i`, or `None` when the slot is undefined or out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&T> {
        match self.defined.get(i) {
            Some(true) => self.values.get(i),
            _ => None,
        }
    }

    /// Iterate `(index, value)` over defined slots only.
    pub fn iter_defined(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.values
            .iter()
            .zip(&self.defined)
            .enumerate()
            .filter_map(|(i, (v, &d))| d.then_some((i, v)))
    }

    /// Number of defined slots.
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.defined.iter().filter(|&&d| d).count()
    }

    fn check_shape(&self) -> Result<(), String> {
        if self.values.len() != self.defined.len() {
            return Err(format!(
                "attribute has {} values but {} definedness flags",
                self.values.len(),
                self.defined.len()
            ));
        }
        Ok(())
    }
}

impl<T: Default> Attribute<T> {
    /// Build from optional values; `None` becomes an undefined default slot.
    pub fn from_options(items: impl IntoIterator<Item = Option<T>>) -> Self {
        let (values, defined) = items
            .into_iter()
            .map(|item| match item {
                Some(v) => (v, true),
                None => (T::default(), false),
            })
            .unzip();
        Self { values, defined }
    }
}

// =============================================================================
// SCALAR
// =============================================================================

/// A single JSON-representable value not tied to any vertex or edge set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scalar {
    pub value: serde_json::Value,
}

impl Scalar {
    #[must_use]
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// Any typed unit of data the engine manages.
///
/// Consumers match this enum exhaustively (no wildcard arms) so adding a
/// variant is a compile error at every site that has to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Entity {
    VertexSet(VertexSet),
    EdgeBundle(EdgeBundle),
    StringAttribute(Attribute<String>),
    DoubleAttribute(Attribute<f64>),
    LongAttribute(Attribute<i64>),
    DoubleTuple2Attribute(Tuple2Attribute<f64>),
    DoubleVectorAttribute(VectorAttribute<f64>),
    Scalar(Scalar),
}

impl Entity {
    /// The variant of this entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Entity::VertexSet(_) => EntityKind::VertexSet,
            Entity::EdgeBundle(_) => EntityKind::EdgeBundle,
            Entity::StringAttribute(_) => EntityKind::StringAttribute,
            Entity::DoubleAttribute(_) => EntityKind::DoubleAttribute,
            Entity::LongAttribute(_) => EntityKind::LongAttribute,
            Entity::DoubleTuple2Attribute(_) => EntityKind::DoubleTuple2Attribute,
            Entity::DoubleVectorAttribute(_) => EntityKind::DoubleVectorAttribute,
            Entity::Scalar(_) => EntityKind::Scalar,
        }
    }

    /// Scalars are kept in memory only and never reach the ordered disk area.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Entity::Scalar(_))
    }

    /// Number of elements (vertices, edges or attribute slots; 1 for scalars).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Entity::VertexSet(vs) => vs.len(),
            Entity::EdgeBundle(eb) => eb.len(),
            Entity::StringAttribute(a) => a.len(),
            Entity::DoubleAttribute(a) => a.len(),
            Entity::LongAttribute(a) => a.len(),
            Entity::DoubleTuple2Attribute(a) => a.len(),
            Entity::DoubleVectorAttribute(a) => a.len(),
            Entity::Scalar(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check structural invariants; violations are `CorruptEntity`.
    pub fn validate(&self) -> Result<(), SphynxError> {
        let result = match self {
            Entity::VertexSet(_) | Entity::Scalar(_) => Ok(()),
            Entity::EdgeBundle(eb) => eb.check_shape(),
            Entity::StringAttribute(a) => a.check_shape(),
            Entity::DoubleAttribute(a) => a.check_shape(),
            Entity::LongAttribute(a) => a.check_shape(),
            Entity::DoubleTuple2Attribute(a) => a.check_shape(),
            Entity::DoubleVectorAttribute(a) => a.check_shape(),
        };
        result.map_err(|reason| SphynxError::CorruptEntity(format!("{}: {}", self.kind(), reason)))
    }

    pub fn as_vertex_set(&self, guid: &Guid) -> Result<&VertexSet, SphynxError> {
        match self {
            Entity::VertexSet(vs) => Ok(vs),
            other => Err(SphynxError::type_mismatch(guid, EntityKind::VertexSet, other.kind())),
        }
    }

    pub fn as_edge_bundle(&self, guid: &Guid) -> Result<&EdgeBundle, SphynxError> {
        match self {
            Entity::EdgeBundle(eb) => Ok(eb),
            other => Err(SphynxError::type_mismatch(guid, EntityKind::EdgeBundle, other.kind())),
        }
    }

    pub fn as_string_attribute(&self, guid: &Guid) -> Result<&Attribute<String>, SphynxError> {
        match self {
            Entity::StringAttribute(a) => Ok(a),
            other => Err(SphynxError::type_mismatch(
                guid,
                EntityKind::StringAttribute,
                other.kind(),
            )),
        }
    }

    pub fn as_double_attribute(&self, guid: &Guid) -> Result<&Attribute<f64>, SphynxError> {
        match self {
            Entity::DoubleAttribute(a) => Ok(a),
            other => Err(SphynxError::type_mismatch(
                guid,
                EntityKind::DoubleAttribute,
                other.kind(),
            )),
        }
    }

    pub fn as_long_attribute(&self, guid: &Guid) -> Result<&Attribute<i64>, SphynxError> {
        match self {
            Entity::LongAttribute(a) => Ok(a),
            other => Err(SphynxError::type_mismatch(
                guid,
                EntityKind::LongAttribute,
                other.kind(),
            )),
        }
    }

    pub fn as_double_tuple2_attribute(
        &self,
        guid: &Guid,
    ) -> Result<&Tuple2Attribute<f64>, SphynxError> {
        match self {
            Entity::DoubleTuple2Attribute(a) => Ok(a),
            other => Err(SphynxError::type_mismatch(
                guid,
                EntityKind::DoubleTuple2Attribute,
                other.kind(),
            )),
        }
    }

    pub fn as_double_vector_attribute(
        &self,
        guid: &Guid,
    ) -> Result<&VectorAttribute<f64>, SphynxError> {
        match self {
            Entity::DoubleVectorAttribute(a) => Ok(a),
            other => Err(SphynxError::type_mismatch(
                guid,
                EntityKind::DoubleVectorAttribute,
                other.kind(),
            )),
        }
    }

    pub fn as_scalar(&self, guid: &Guid) -> Result<&Scalar, SphynxError> {
        match self {
            Entity::Scalar(s) => Ok(s),
            other => Err(SphynxError::type_mismatch(guid, EntityKind::Scalar, other.kind())),
        }
    }
}

impl From<VertexSet> for Entity {
    fn from(vs: VertexSet) -> Self {
        Entity::VertexSet(vs)
    }
}

impl From<EdgeBundle> for Entity {
    fn from(eb: EdgeBundle) -> Self {
        Entity::EdgeBundle(eb)
    }
}

impl From<Attribute<String>> for Entity {
    fn from(a: Attribute<String>) -> Self {
        Entity::StringAttribute(a)
    }
}

impl From<Attribute<f64>> for Entity {
    fn from(a: Attribute<f64>) -> Self {
        Entity::DoubleAttribute(a)
    }
}

impl From<Attribute<i64>> for Entity {
    fn from(a: Attribute<i64>) -> Self {
        Entity::LongAttribute(a)
    }
}

impl From<Tuple2Attribute<f64>> for Entity {
    fn from(a: Tuple2Attribute<f64>) -> Self {
        Entity::DoubleTuple2Attribute(a)
    }
}

impl From<VectorAttribute<f64>> for Entity {
    fn from(a: VectorAttribute<f64>) -> Self {
        Entity::DoubleVectorAttribute(a)
    }
}

impl From<Scalar> for Entity {
    fn from(s: Scalar) -> Self {
        Entity::Scalar(s)
    }
}

// =============================================================================
// TESTS
// =============================================================================
