use crate::model::{Id, Product};
use serde::{Deserialize, Serialize};

/// One membership entry of an attribute group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupItem {
    #[serde(rename = "attribute")]
    pub attribute_id: Id,
}

/// A named grouping of attribute ids. A product's applicable groups come
/// either from its assigned family (inherited) or from product-level group
/// assignments when no family exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeGroup {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub items: Vec<GroupItem>,
}

impl AttributeGroup {
    pub fn contains(&self, attribute_id: &str) -> bool {
        self.items.iter().any(|item| item.attribute_id == attribute_id)
    }

    pub fn attribute_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.attribute_id.as_str())
    }
}

/// Body element of `POST /api/products/{id}/family-overrides/`, used to add
/// or remove an inherited group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyOverride {
    pub attribute_group: Id,
    pub removed: bool,
}

/// The effective group list for a product: family groups when the product
/// has a family, product-level groups otherwise.
pub fn effective_groups<'a>(
    product: &Product,
    family_groups: &'a [AttributeGroup],
    product_groups: &'a [AttributeGroup],
) -> &'a [AttributeGroup] {
    if product.has_family() {
        family_groups
    } else {
        product_groups
    }
}
