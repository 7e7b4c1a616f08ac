use crate::logic::resolve;
use crate::model::{AttributeCatalog, AttributeGroup, AttributeValue, Scope};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Completeness of a product for one scope: how many mandatory attributes
/// across the effective groups have a resolvable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessScore {
    pub filled: usize,
    pub required: usize,
}

impl CompletenessScore {
    pub fn percent(&self) -> f64 {
        if self.required == 0 {
            100.0
        } else {
            self.filled as f64 / self.required as f64 * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.filled >= self.required
    }
}

/// Score mandatory-attribute completeness over the effective group list.
/// Attributes listed by several groups count once.
pub fn completeness(
    catalog: &AttributeCatalog,
    groups: &[AttributeGroup],
    values: &[AttributeValue],
    scope: &Scope,
) -> CompletenessScore {
    let mandatory_ids: Vec<&str> = groups
        .iter()
        .flat_map(|group| group.attribute_ids())
        .unique()
        .filter(|id| catalog.get(id).map(|def| def.is_mandatory).unwrap_or(false))
        .collect();

    let filled = mandatory_ids
        .iter()
        .filter(|id| resolve(values, id, scope).is_some())
        .count();

    CompletenessScore {
        filled,
        required: mandatory_ids.len(),
    }
}
