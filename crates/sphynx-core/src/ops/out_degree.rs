use crate::accessor::EntityAccessor;
use crate::entity::Attribute;
use crate::registry::Operation;
use crate::SphynxError;

/// Number of outgoing edges of every vertex of `src`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutDegree;

impl Operation for OutDegree {
    fn execute(&self, ea: &mut EntityAccessor<'_>) -> Result<(), SphynxError> {
        let src = ea.get_vertex_set("src")?;
        let es = ea.get_edge_bundle("es")?;
        // Only the source side is indexed; the destination set is not an input.
        if let Some(bad) = es.src.iter().find(|&&s| s < 0 || s as usize >= src.len()) {
            return Err(SphynxError::CorruptEntity(format!(
                "edge source {} is outside the source vertex set ({} vertices)",
                bad,
                src.len()
            )));
        }

        let mut degree = vec![0.0; src.len()];
        for (s, _) in es.edges() {
            degree[s] += 1.0;
        }
        let defined = vec![true; degree.len()];
        ea.output("outDegree", Attribute::<f64>::new(degree, defined)?)
    }
}
