use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type Id = String;

/// Data types an attribute definition can declare. Each maps to one
/// `ValueBody` shape and one validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Number,
    Boolean,
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    Date,
    Email,
    Phone,
    Url,
    Price,
    Measurement,
    Media,
    RichText,
}

/// Locale/channel scoping for an attribute value. `None` on either axis
/// means the value applies globally along that axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Scope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Scope {
    pub fn new(locale: Option<String>, channel: Option<String>) -> Self {
        Self { locale, channel }
    }

    /// The global scope: applies to every locale and channel.
    pub fn global() -> Self {
        Self {
            locale: None,
            channel: None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.locale.is_none() && self.channel.is_none()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.locale.as_deref().unwrap_or("*"),
            self.channel.as_deref().unwrap_or("*")
        )
    }
}

/// Minimal product record: values and groups hang off a product, and the
/// effective group list depends on whether it has a family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<Id>,
}

impl Product {
    pub fn has_family(&self) -> bool {
        self.family.is_some()
    }
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
