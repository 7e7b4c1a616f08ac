use crate::model::{DataType, Id};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One selectable option of a select/multiselect attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeOption {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// An attribute definition. Immutable per catalog fetch; one definition may
/// have many stored values (one per locale/channel combination).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Id>,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
    /// Declared option values for select/multiselect attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<AttributeOption>,
    /// Optional regex applied to text values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<String>,
}

impl AttributeDefinition {
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// Read-only attribute catalog, fetched once per session and passed
/// explicitly to whatever needs definition lookups.
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    attributes: Vec<AttributeDefinition>,
    by_id: HashMap<Id, usize>,
}

impl AttributeCatalog {
    pub fn new(attributes: Vec<AttributeDefinition>) -> Self {
        let by_id = attributes
            .iter()
            .enumerate()
            .map(|(idx, def)| (def.id.clone(), idx))
            .collect();
        Self { attributes, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&AttributeDefinition> {
        self.by_id.get(id).map(|idx| &self.attributes[*idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter()
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter().filter(|def| def.is_mandatory)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_def(id: &str) -> AttributeDefinition {
        AttributeDefinition {
            id: id.to_string(),
            name: id.to_string(),
            group_id: None,
            data_type: DataType::Text,
            unit: None,
            is_mandatory: false,
            options: Vec::new(),
            validation_rule: None,
        }
    }

    #[test]
    fn catalog_lookup_by_id() {
        let catalog = AttributeCatalog::new(vec![text_def("color"), text_def("weight")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("weight").map(|d| d.name.as_str()), Some("weight"));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn mandatory_filter() {
        let mut def = text_def("sku");
        def.is_mandatory = true;
        let catalog = AttributeCatalog::new(vec![def, text_def("notes")]);
        let mandatory: Vec<_> = catalog.mandatory().map(|d| d.id.as_str()).collect();
        assert_eq!(mandatory, vec!["sku"]);
    }

    #[test]
    fn definition_deserializes_without_optional_fields() {
        let json = r#"{"id": "a1", "name": "Color", "data_type": "select"}"#;
        let def: AttributeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.data_type, DataType::Select);
        assert!(!def.is_mandatory);
        assert!(def.options.is_empty());
    }
}
