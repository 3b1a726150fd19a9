//! # Operation Registry
//!
//! Immutable name → operation table. It is built once, before the server
//! accepts requests, and only read afterwards.

use crate::accessor::EntityAccessor;
use crate::ops::{ExampleGraph, Node2Vec, OneHotEncoder, OutDegree};
use crate::SphynxError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The execution contract every operation satisfies.
///
/// Implementations read inputs and parameters from the accessor and write
/// their outputs back to it. They must not touch the store directly.
pub trait Operation: Send + Sync {
    fn execute(&self, ea: &mut EntityAccessor<'_>) -> Result<(), SphynxError>;
}

/// Settings the built-in operations need from the process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationsConfig {
    /// Argument-vector prefix of the external embedding helper.
    pub node2vec_command: Vec<String>,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            node2vec_command: vec!["python".to_string(), "node2vec.py".to_string()],
        }
    }
}

/// Read-only table of executable operations.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<&'static str, Arc<dyn Operation>>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OperationRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every built-in operation.
    pub fn standard(config: &OperationsConfig) -> Result<Self, SphynxError> {
        Ok(Self::builder()
            .register("ExampleGraph", ExampleGraph)?
            .register("OneHotEncoder", OneHotEncoder)?
            .register("OutDegree", OutDegree)?
            .register("Node2Vec", Node2Vec::new(config.node2vec_command.clone()))?
            .build())
    }

    /// Exact-match lookup by short name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operations.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Builder that rejects duplicate names.
#[derive(Default)]
pub struct RegistryBuilder {
    operations: BTreeMap<&'static str, Arc<dyn Operation>>,
}

impl RegistryBuilder {
    pub fn register(
        mut self,
        name: &'static str,
        operation: impl Operation + 'static,
    ) -> Result<Self, SphynxError> {
        if self.operations.contains_key(name) {
            return Err(SphynxError::DuplicateOperation(name.to_string()));
        }
        self.operations.insert(name, Arc::new(operation));
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> OperationRegistry {
        OperationRegistry {
            operations: self.operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Operation for Noop {
        fn execute(&self, _ea: &mut EntityAccessor<'_>) -> Result<(), SphynxError> {
            Ok(())
        }
    }

    #[test]
    fn standard_registry_is_sorted() {
        let registry = OperationRegistry::standard(&OperationsConfig::default()).expect("registry");
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["ExampleGraph", "Node2Vec", "OneHotEncoder", "OutDegree"]);
        assert!(registry.contains("OutDegree"));
        assert!(!registry.contains("outdegree"));
        assert!(registry.get("PageRank").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = OperationRegistry::builder()
            .register("Noop", Noop)
            .and_then(|b| b.register("Noop", Noop));
        assert!(matches!(result, Err(SphynxError::DuplicateOperation(n)) if n == "Noop"));
    }

    #[test]
    fn empty_registry() {
        let registry = OperationRegistry::builder().build();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
