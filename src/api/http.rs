use crate::api::{classify_error, ApiClient, ApiError};
use crate::model::{
    Asset, AttributeDefinition, AttributeGroup, AttributeValue, AttributeValueUpdate,
    FamilyOverride, MediaUpload, NewAttributeValue, NewBundle, Scope,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// HTTP implementation of the backend contract.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn scoped(&self, builder: RequestBuilder, scope: &Scope) -> RequestBuilder {
        let mut builder = builder;
        if let Some(locale) = &scope.locale {
            builder = builder.query(&[("locale", locale)]);
        }
        if let Some(channel) = &scope.channel {
            builder = builder.query(&[("channel", channel)]);
        }
        builder
    }

    /// Read queries retry once on transport errors. Responses the backend
    /// actually produced are never retried.
    async fn get_with_retry(&self, path: &str, scope: Option<&Scope>) -> Result<Response, ApiError> {
        let build = || {
            let builder = self.authed(self.client.get(self.url(path)));
            match scope {
                Some(scope) => self.scoped(builder, scope),
                None => builder,
            }
        };
        match build().send().await {
            Ok(response) => Ok(response),
            Err(first) => {
                log::warn!("GET {} failed ({}), retrying once", path, first);
                build().send().await.map_err(ApiError::from)
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

async fn read_empty(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpApi {
    async fn fetch_catalog(&self) -> Result<Vec<AttributeDefinition>, ApiError> {
        let response = self.get_with_retry("/api/attributes/", None).await?;
        read_json(response).await
    }

    async fn list_values(
        &self,
        product: &str,
        scope: &Scope,
    ) -> Result<Vec<AttributeValue>, ApiError> {
        let path = format!("/api/products/{}/attributes/", product);
        let response = self.get_with_retry(&path, Some(scope)).await?;
        read_json(response).await
    }

    async fn create_value(
        &self,
        new_value: NewAttributeValue,
    ) -> Result<AttributeValue, ApiError> {
        let path = format!("/api/products/{}/attributes/", new_value.product);
        let response = self
            .authed(self.client.post(self.url(&path)))
            .json(&new_value)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_value(
        &self,
        product: &str,
        attribute: &str,
        scope: &Scope,
        update: AttributeValueUpdate,
    ) -> Result<AttributeValue, ApiError> {
        let path = format!("/api/products/{}/attributes/{}/", product, attribute);
        let builder = self.authed(self.client.patch(self.url(&path))).json(&update);
        let response = self.scoped(builder, scope).send().await?;
        read_json(response).await
    }

    async fn delete_value(
        &self,
        product: &str,
        attribute: &str,
        scope: &Scope,
    ) -> Result<(), ApiError> {
        let path = format!("/api/products/{}/attributes/{}/", product, attribute);
        let builder = self.authed(self.client.delete(self.url(&path)));
        let response = self.scoped(builder, scope).send().await?;
        read_empty(response).await
    }

    async fn list_groups(
        &self,
        product: &str,
        scope: &Scope,
    ) -> Result<Vec<AttributeGroup>, ApiError> {
        let path = format!("/api/products/{}/attribute-groups/", product);
        let response = self.get_with_retry(&path, Some(scope)).await?;
        read_json(response).await
    }

    async fn set_family_overrides(
        &self,
        product: &str,
        overrides: Vec<FamilyOverride>,
    ) -> Result<(), ApiError> {
        let path = format!("/api/products/{}/family-overrides/", product);
        let response = self
            .authed(self.client.post(self.url(&path)))
            .json(&overrides)
            .send()
            .await?;
        read_empty(response).await
    }

    async fn upload_media(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .authed(self.client.post(self.url("/api/media/upload/")))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_assets(&self, product: &str) -> Result<Vec<Asset>, ApiError> {
        let path = format!("/api/products/{}/assets/", product);
        let response = self.get_with_retry(&path, None).await?;
        read_json(response).await
    }

    async fn delete_asset(&self, product: &str, asset_id: i64) -> Result<(), ApiError> {
        let path = format!("/api/products/{}/assets/{}/", product, asset_id);
        let response = self.authed(self.client.delete(self.url(&path))).send().await?;
        read_empty(response).await
    }

    async fn archive_asset(&self, product: &str, asset_id: i64) -> Result<Asset, ApiError> {
        let path = format!("/api/products/{}/assets/{}/archive/", product, asset_id);
        let response = self.authed(self.client.post(self.url(&path))).send().await?;
        read_json(response).await
    }

    async fn create_bundle(&self, bundle: NewBundle) -> Result<Asset, ApiError> {
        let path = format!("/api/products/{}/assets/bundles/", bundle.product);
        let response = self
            .authed(self.client.post(self.url(&path)))
            .json(&bundle)
            .send()
            .await?;
        read_json(response).await
    }

    async fn download_all(&self, product: &str) -> Result<Vec<u8>, ApiError> {
        let path = format!("/api/products/{}/assets/download/", product);
        let response = self.get_with_retry(&path, None).await?;
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_error(status.as_u16(), &body))
        }
    }
}
