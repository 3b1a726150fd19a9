//! Small fixed graph used for smoke tests and demos.
//!
//! Four people, four edges. Only outputs the caller declared are emitted,
//! so a descriptor may ask for any subset.

use crate::accessor::EntityAccessor;
use crate::entity::{Attribute, EdgeBundle, Scalar, VertexSet};
use crate::registry::Operation;
use crate::{Entity, SphynxError};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleGraph;

impl Operation for ExampleGraph {
    fn execute(&self, ea: &mut EntityAccessor<'_>) -> Result<(), SphynxError> {
        let outputs: [(&str, Entity); 10] = [
            ("vertices", VertexSet::new(vec![0, 1, 2, 3]).into()),
            (
                "edges",
                EdgeBundle::new(vec![0, 1, 2, 2], vec![1, 0, 0, 1], vec![0, 1, 2, 3])?.into(),
            ),
            (
                "name",
                strings(["Adam", "Eve", "Bob", "Isolated Joe"]).into(),
            ),
            ("age", Attribute::<f64>::new(vec![20.3, 18.2, 50.3, 2.0], vec![true; 4])?.into()),
            ("gender", strings(["Male", "Female", "Male", "Male"]).into()),
            (
                "income",
                Attribute::<f64>::from_options([Some(1000.0), None, Some(2000.0), None]).into(),
            ),
            (
                "location",
                Attribute::<(f64, f64)>::new(
                    vec![
                        (40.71448, -74.00598),
                        (47.5269674, 19.0323968),
                        (1.352083, 103.819836),
                        (-33.8674869, 151.2069902),
                    ],
                    vec![true; 4],
                )?
                .into(),
            ),
            (
                "comment",
                strings([
                    "Adam loves Eve",
                    "Eve loves Adam",
                    "Bob envies Adam",
                    "Bob loves Eve",
                ])
                .into(),
            ),
            ("weight", Attribute::<f64>::new(vec![1.0, 2.0, 3.0, 4.0], vec![true; 4])?.into()),
            ("greeting", Scalar::new("Hello world! 😀 ").into()),
        ];

        for (name, entity) in outputs {
            if ea.has_output(name) {
                ea.output(name, entity)?;
            }
        }
        Ok(())
    }
}

fn strings<const N: usize>(items: [&str; N]) -> Attribute<String> {
    Attribute::from_options(items.map(|s| Some(s.to_string())))
}
