use crate::model::{DataType, Id, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The shape-per-type payload of an attribute value. Tagged so validator and
/// editor dispatch is exhaustiveness-checked instead of probing JSON shapes
/// at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueBody {
    Text { value: String },
    Number { value: f64 },
    Boolean { value: bool },
    Select { value: String },
    #[serde(rename = "multiselect")]
    MultiSelect { values: Vec<String> },
    Date { value: String },
    Email { value: String },
    Phone { value: String },
    Url { value: String },
    Price { amount: f64, currency: String },
    Measurement { amount: f64, unit: String },
    Media { asset_id: i64 },
    RichText { html: String },
}

impl ValueBody {
    pub fn data_type(&self) -> DataType {
        match self {
            ValueBody::Text { .. } => DataType::Text,
            ValueBody::Number { .. } => DataType::Number,
            ValueBody::Boolean { .. } => DataType::Boolean,
            ValueBody::Select { .. } => DataType::Select,
            ValueBody::MultiSelect { .. } => DataType::MultiSelect,
            ValueBody::Date { .. } => DataType::Date,
            ValueBody::Email { .. } => DataType::Email,
            ValueBody::Phone { .. } => DataType::Phone,
            ValueBody::Url { .. } => DataType::Url,
            ValueBody::Price { .. } => DataType::Price,
            ValueBody::Measurement { .. } => DataType::Measurement,
            ValueBody::Media { .. } => DataType::Media,
            ValueBody::RichText { .. } => DataType::RichText,
        }
    }

    /// Seed draft for a fresh edit of the given data type: empty string,
    /// `false`, `0`, or `[]` depending on the shape.
    pub fn draft(data_type: DataType) -> Self {
        match data_type {
            DataType::Text => ValueBody::Text {
                value: String::new(),
            },
            DataType::Number => ValueBody::Number { value: 0.0 },
            DataType::Boolean => ValueBody::Boolean { value: false },
            DataType::Select => ValueBody::Select {
                value: String::new(),
            },
            DataType::MultiSelect => ValueBody::MultiSelect { values: Vec::new() },
            DataType::Date => ValueBody::Date {
                value: String::new(),
            },
            DataType::Email => ValueBody::Email {
                value: String::new(),
            },
            DataType::Phone => ValueBody::Phone {
                value: String::new(),
            },
            DataType::Url => ValueBody::Url {
                value: String::new(),
            },
            DataType::Price => ValueBody::Price {
                amount: 0.0,
                currency: String::new(),
            },
            DataType::Measurement => ValueBody::Measurement {
                amount: 0.0,
                unit: String::new(),
            },
            DataType::Media => ValueBody::Media { asset_id: 0 },
            DataType::RichText => ValueBody::RichText {
                html: String::new(),
            },
        }
    }

    /// Whether the payload counts as empty for the mandatory-attribute rule.
    /// Numbers and booleans always carry a value; strings are empty when
    /// blank, lists when they have no elements, media when no asset is set.
    pub fn is_empty(&self) -> bool {
        match self {
            ValueBody::Text { value }
            | ValueBody::Select { value }
            | ValueBody::Date { value }
            | ValueBody::Email { value }
            | ValueBody::Phone { value }
            | ValueBody::Url { value } => value.trim().is_empty(),
            ValueBody::RichText { html } => html.trim().is_empty(),
            ValueBody::MultiSelect { values } => values.is_empty(),
            ValueBody::Price { currency, .. } => currency.trim().is_empty(),
            ValueBody::Measurement { unit, .. } => unit.trim().is_empty(),
            ValueBody::Media { asset_id } => *asset_id <= 0,
            ValueBody::Number { .. } | ValueBody::Boolean { .. } => false,
        }
    }
}

/// A stored attribute value: sparse per (attribute, locale, channel). At most
/// one row exists per exact triple; the backend rejects duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Id,
    #[serde(rename = "attribute")]
    pub attribute_id: Id,
    #[serde(rename = "value")]
    pub body: ValueBody,
    pub locale: Option<String>,
    pub channel: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AttributeValue {
    pub fn scope(&self) -> Scope {
        Scope::new(self.locale.clone(), self.channel.clone())
    }

    /// Global values (locale and channel both null) apply to every
    /// locale/channel view; deleting one has a correspondingly wide blast
    /// radius.
    pub fn is_global(&self) -> bool {
        self.locale.is_none() && self.channel.is_none()
    }

    pub fn matches_scope(&self, scope: &Scope) -> bool {
        self.locale == scope.locale && self.channel == scope.channel
    }
}

/// Create input for `POST /api/products/{id}/attributes/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttributeValue {
    pub attribute: Id,
    pub product: Id,
    pub value: ValueBody,
    pub locale: Option<String>,
    pub channel: Option<String>,
}

impl NewAttributeValue {
    pub fn into_value(self, id: Id) -> AttributeValue {
        AttributeValue {
            id,
            attribute_id: self.attribute,
            body: self.value,
            locale: self.locale,
            channel: self.channel,
            updated_at: Utc::now(),
        }
    }
}

/// Patch input for `PATCH /api/products/{id}/attributes/{attrId}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValueUpdate {
    pub value: ValueBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_serializes_with_kind_tag() {
        let body = ValueBody::Price {
            amount: 19.5,
            currency: "EUR".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "price");
        assert_eq!(json["amount"], 19.5);
        assert_eq!(json["currency"], "EUR");
    }

    #[test]
    fn multiselect_round_trips_with_legacy_tag() {
        let json = r#"{"kind": "multiselect", "values": ["red", "blue"]}"#;
        let body: ValueBody = serde_json::from_str(json).unwrap();
        assert_eq!(
            body,
            ValueBody::MultiSelect {
                values: vec!["red".to_string(), "blue".to_string()]
            }
        );
    }

    #[test]
    fn draft_matches_data_type() {
        for dt in [
            DataType::Text,
            DataType::Number,
            DataType::Boolean,
            DataType::MultiSelect,
            DataType::Price,
            DataType::Media,
        ] {
            assert_eq!(ValueBody::draft(dt).data_type(), dt);
        }
    }

    #[test]
    fn emptiness_rules() {
        assert!(ValueBody::Text {
            value: "  ".to_string()
        }
        .is_empty());
        assert!(ValueBody::MultiSelect { values: vec![] }.is_empty());
        assert!(ValueBody::Media { asset_id: 0 }.is_empty());
        assert!(!ValueBody::Number { value: 0.0 }.is_empty());
        assert!(!ValueBody::Boolean { value: false }.is_empty());
    }

    #[test]
    fn global_scope_detection() {
        let value = AttributeValue {
            id: "v1".to_string(),
            attribute_id: "a1".to_string(),
            body: ValueBody::Text {
                value: "x".to_string(),
            },
            locale: None,
            channel: None,
            updated_at: Utc::now(),
        };
        assert!(value.is_global());
        assert!(value.matches_scope(&Scope::global()));
        assert!(!value.matches_scope(&Scope::new(Some("en".to_string()), None)));
    }
}
