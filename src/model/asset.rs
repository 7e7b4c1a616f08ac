use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A media asset attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub updated_at: DateTime<Utc>,
}

/// Response of `POST /api/media/upload/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub asset_id: i64,
}

/// Input for creating an asset bundle from existing assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBundle {
    pub product: Id,
    pub name: String,
    pub asset_ids: Vec<i64>,
}
