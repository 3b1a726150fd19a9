//! # Built-in Operations
//!
//! Each operation is a unit struct (or a small config holder) implementing
//! [`crate::registry::Operation`]. They are wired into the registry by
//! [`crate::registry::OperationRegistry::standard`].

pub mod example_graph;
pub mod node2vec;
pub mod one_hot_encoder;
pub mod out_degree;

pub use example_graph::ExampleGraph;
pub use node2vec::Node2Vec;
pub use one_hot_encoder::OneHotEncoder;
pub use out_degree::OutDegree;
