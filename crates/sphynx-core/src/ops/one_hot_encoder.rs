use crate::accessor::EntityAccessor;
use crate::entity::Attribute;
use crate::registry::Operation;
use crate::SphynxError;
use std::collections::HashMap;

/// One-hot encodes a string attribute against a fixed category list.
///
/// Undefined inputs stay undefined. A value outside `categories` becomes
/// the all-zero vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneHotEncoder;

impl Operation for OneHotEncoder {
    fn execute(&self, ea: &mut EntityAccessor<'_>) -> Result<(), SphynxError> {
        let cat_attr = ea.get_string_attribute("catAttr")?;
        let categories = ea.get_string_vector_param("categories")?;

        let ids: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, cat)| (cat.as_str(), i))
            .collect();

        let mut values = vec![Vec::new(); cat_attr.len()];
        for (i, value) in cat_attr.iter_defined() {
            let mut one_hot = vec![0.0; categories.len()];
            if let Some(&id) = ids.get(value.as_str()) {
                one_hot[id] = 1.0;
            }
            values[i] = one_hot;
        }
        let one_hot_vector = Attribute::new(values, cat_attr.defined.clone())?;

        ea.output("oneHotVector", one_hot_vector)
    }
}
