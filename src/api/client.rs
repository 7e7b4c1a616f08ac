use crate::api::ApiError;
use crate::model::{
    Asset, AttributeDefinition, AttributeGroup, AttributeValue, AttributeValueUpdate,
    FamilyOverride, MediaUpload, NewAttributeValue, NewBundle, Scope,
};

/// The backend REST contract the engine depends on. The HTTP implementation
/// talks to the real backend; the in-memory one backs tests and offline use.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Attribute definitions, fetched once per session.
    async fn fetch_catalog(&self) -> Result<Vec<AttributeDefinition>, ApiError>;

    /// `GET /api/products/{id}/attributes/?locale&channel`
    async fn list_values(
        &self,
        product: &str,
        scope: &Scope,
    ) -> Result<Vec<AttributeValue>, ApiError>;

    /// `POST /api/products/{id}/attributes/`
    async fn create_value(&self, new_value: NewAttributeValue)
        -> Result<AttributeValue, ApiError>;

    /// `PATCH /api/products/{id}/attributes/{attrId}/?locale&channel`
    async fn update_value(
        &self,
        product: &str,
        attribute: &str,
        scope: &Scope,
        update: AttributeValueUpdate,
    ) -> Result<AttributeValue, ApiError>;

    /// `DELETE /api/products/{id}/attributes/{attrId}/?locale&channel`
    async fn delete_value(
        &self,
        product: &str,
        attribute: &str,
        scope: &Scope,
    ) -> Result<(), ApiError>;

    /// `GET /api/products/{id}/attribute-groups/?locale&channel`
    async fn list_groups(
        &self,
        product: &str,
        scope: &Scope,
    ) -> Result<Vec<AttributeGroup>, ApiError>;

    /// `POST /api/products/{id}/family-overrides/`
    async fn set_family_overrides(
        &self,
        product: &str,
        overrides: Vec<FamilyOverride>,
    ) -> Result<(), ApiError>;

    /// `POST /api/media/upload/` (multipart), returns `{asset_id}`.
    async fn upload_media(&self, filename: &str, bytes: Vec<u8>)
        -> Result<MediaUpload, ApiError>;

    /// `GET /api/products/{id}/assets/`
    async fn list_assets(&self, product: &str) -> Result<Vec<Asset>, ApiError>;

    /// `DELETE /api/products/{id}/assets/{assetId}/`
    async fn delete_asset(&self, product: &str, asset_id: i64) -> Result<(), ApiError>;

    /// `POST /api/products/{id}/assets/{assetId}/archive/`
    async fn archive_asset(&self, product: &str, asset_id: i64) -> Result<Asset, ApiError>;

    /// `POST /api/products/{id}/assets/bundles/`
    async fn create_bundle(&self, bundle: NewBundle) -> Result<Asset, ApiError>;

    /// `GET /api/products/{id}/assets/download/`, a zip of all assets.
    async fn download_all(&self, product: &str) -> Result<Vec<u8>, ApiError>;
}
