//! # Dispatch Tests
//!
//! End-to-end runs of the standard registry through `Engine`.

use sphynx_core::{
    Attribute, Engine, Entity, EntityStore, Guid, OperationDescriptor, OperationRegistry,
    OperationsConfig, SphynxError,
};
use std::sync::Arc;
use tempfile::{TempDir, tempdir};

fn engine() -> (TempDir, Engine) {
    let temp = tempdir().expect("temp dir");
    let store = EntityStore::open(temp.path().join("ordered"), temp.path().join("unordered"))
        .expect("store");
    let registry = OperationRegistry::standard(&OperationsConfig::default()).expect("registry");
    (temp, Engine::new(Arc::new(store), registry))
}

fn example_graph() -> OperationDescriptor {
    OperationDescriptor::new("ExampleGraph")
        .output("vertices", "eg-vertices")
        .output("edges", "eg-edges")
        .output("edges-idSet", "eg-edge-ids")
        .output("name", "eg-name")
        .output("age", "eg-age")
        .output("income", "eg-income")
        .output("greeting", "eg-greeting")
}

fn run(engine: &Engine, desc: &OperationDescriptor) -> Result<Vec<Guid>, SphynxError> {
    let persist = engine.compute(&desc.to_json().expect("json"))?;
    Ok(persist.into_iter().map(|(guid, _)| guid).collect())
}

mod example_graph {
    use super::*;

    #[test]
    fn all_requested_outputs_are_resident() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("compute");

        for guid in example_graph().outputs.values() {
            assert!(engine.has_in_memory(guid), "{guid}");
        }
    }

    #[test]
    fn edge_id_set_matches_edge_mapping() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("compute");

        let edges = engine.store().get(&Guid::new("eg-edges")).expect("edges");
        let ids = engine.store().get(&Guid::new("eg-edge-ids")).expect("ids");
        let eb = edges.as_edge_bundle(&Guid::new("eg-edges")).expect("bundle");
        let vs = ids.as_vertex_set(&Guid::new("eg-edge-ids")).expect("vertex set");
        assert_eq!(vs.mapping_to_unordered, eb.edge_mapping);
    }

    #[test]
    fn greeting_scalar_is_json() {
        let (_temp, engine) = engine();
        let persisted = run(&engine, &example_graph()).expect("compute");

        let json = engine.get_scalar(&Guid::new("eg-greeting")).expect("scalar");
        assert_eq!(json, "\"Hello world! 😀 \"");
        assert!(!persisted.contains(&Guid::new("eg-greeting")));
    }

    #[test]
    fn recompute_keeps_shape() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("first");
        let first = engine.store().get(&Guid::new("eg-income")).expect("income");
        run(&engine, &example_graph()).expect("second");
        let second = engine.store().get(&Guid::new("eg-income")).expect("income");

        assert_eq!(first.kind(), second.kind());
        assert_eq!(first.len(), second.len());
        assert!(second.validate().is_ok());
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn out_degree_over_example_graph() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("example graph");

        let desc = OperationDescriptor::new("OutDegree")
            .input("src", "eg-vertices")
            .input("es", "eg-edges")
            .output("outDegree", "deg");
        run(&engine, &desc).expect("out degree");

        let deg = engine.store().get(&Guid::new("deg")).expect("degree");
        let attr = deg.as_double_attribute(&Guid::new("deg")).expect("double");
        assert_eq!(attr.values, vec![1.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn one_hot_over_example_graph_names() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("example graph");

        let desc = OperationDescriptor::new("OneHotEncoder")
            .input("catAttr", "eg-name")
            .output("oneHotVector", "one-hot")
            .param("categories", serde_json::json!(["Eve", "Adam"]));
        run(&engine, &desc).expect("one hot");

        let out = engine.store().get(&Guid::new("one-hot")).expect("one hot");
        let attr = out
            .as_double_vector_attribute(&Guid::new("one-hot"))
            .expect("vector");
        assert_eq!(attr.get(0), Some(&vec![0.0, 1.0]));
        assert_eq!(attr.get(1), Some(&vec![1.0, 0.0]));
        assert_eq!(attr.get(3), Some(&vec![0.0, 0.0]));
    }

    #[test]
    fn wrong_input_kind_is_type_mismatch() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("example graph");

        let desc = OperationDescriptor::new("OneHotEncoder")
            .input("catAttr", "eg-age")
            .output("oneHotVector", "one-hot")
            .param("categories", serde_json::json!(["a"]));
        assert!(matches!(
            run(&engine, &desc),
            Err(SphynxError::TypeMismatch { .. })
        ));
        assert!(!engine.has_in_memory(&Guid::new("one-hot")));
    }

    #[test]
    fn inputs_are_not_loaded_from_disk() {
        let (_temp, engine) = engine();
        let guid = Guid::new("only-on-disk");
        let attr = Attribute::from_options([Some("x".to_string())]);
        engine
            .store()
            .persist(&guid, &Entity::from(attr))
            .expect("persist");

        let desc = OperationDescriptor::new("OneHotEncoder")
            .input("catAttr", "only-on-disk")
            .output("oneHotVector", "one-hot")
            .param("categories", serde_json::json!(["x"]));
        assert!(matches!(
            run(&engine, &desc),
            Err(SphynxError::EntityNotFound(_))
        ));

        engine.read_from_ordered_disk(&guid).expect("promote");
        run(&engine, &desc).expect("now resident");
    }

    #[test]
    fn missing_parameter_is_invalid_parameter() {
        let (_temp, engine) = engine();
        run(&engine, &example_graph()).expect("example graph");

        let desc = OperationDescriptor::new("OneHotEncoder")
            .input("catAttr", "eg-name")
            .output("oneHotVector", "one-hot");
        assert!(matches!(
            run(&engine, &desc),
            Err(SphynxError::InvalidParameter { .. })
        ));
    }
}

mod persistence {
    use super::*;

    #[test]
    fn persist_list_round_trips_through_disk() {
        let (_temp, engine) = engine();
        let persist = engine
            .compute(&example_graph().to_json().expect("json"))
            .expect("compute");

        for (guid, entity) in &persist {
            assert!(!entity.is_scalar());
            engine.store().persist(guid, entity).expect("persist");
            assert!(engine.has_on_ordered_disk(guid).expect("probe"));
        }
        assert!(!engine
            .has_on_ordered_disk(&Guid::new("eg-greeting"))
            .expect("probe"));

        // A second engine over the same disk areas starts with empty memory.
        let store = EntityStore::open(
            engine.store().ordered().root(),
            engine.store().unordered().root(),
        )
        .expect("store");
        let registry = OperationRegistry::standard(&OperationsConfig::default()).expect("registry");
        let fresh = Engine::new(Arc::new(store), registry);

        let guid = Guid::new("eg-income");
        assert!(!fresh.has_in_memory(&guid));
        fresh.read_from_ordered_disk(&guid).expect("promote");
        assert_eq!(
            fresh.store().get(&guid).as_deref(),
            engine.store().get(&guid).as_deref()
        );
    }
}
