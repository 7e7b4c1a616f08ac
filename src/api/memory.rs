use crate::api::{ApiClient, ApiError};
use crate::model::{
    generate_id, Asset, AttributeDefinition, AttributeGroup, AttributeValue,
    AttributeValueUpdate, FamilyOverride, Id, MediaUpload, NewAttributeValue, NewBundle, Scope,
};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct State {
    catalog: Vec<AttributeDefinition>,
    groups: Vec<AttributeGroup>,
    removed_groups: HashSet<Id>,
    values: HashMap<Id, Vec<AttributeValue>>,
    assets: HashMap<Id, Vec<Asset>>,
    fail_create_for: HashSet<Id>,
    next_asset: i64,
    calls: u64,
}

/// In-memory backend: enforces the same uniqueness invariant the real
/// backend does, and can be scripted to fail specific create calls. Used by
/// tests and offline demos.
#[derive(Default)]
pub struct MemoryApi {
    state: Mutex<State>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_catalog(&self, defs: Vec<AttributeDefinition>) {
        self.state.lock().catalog = defs;
    }

    pub fn seed_groups(&self, groups: Vec<AttributeGroup>) {
        self.state.lock().groups = groups;
    }

    pub fn seed_value(&self, product: &str, value: AttributeValue) {
        self.state
            .lock()
            .values
            .entry(product.to_string())
            .or_default()
            .push(value);
    }

    /// Script the next create calls for this attribute id to fail.
    pub fn fail_create_for(&self, attribute_id: &str) {
        self.state
            .lock()
            .fail_create_for
            .insert(attribute_id.to_string());
    }

    /// Number of API calls made so far, for asserting that client-side
    /// gates (permissions, validation) short-circuit before the network.
    pub fn call_count(&self) -> u64 {
        self.state.lock().calls
    }

    /// Stored values for a product, for test inspection.
    pub fn stored_values(&self, product: &str) -> Vec<AttributeValue> {
        self.state
            .lock()
            .values
            .get(product)
            .cloned()
            .unwrap_or_default()
    }

    fn tick(&self) {
        self.state.lock().calls += 1;
    }
}

#[async_trait::async_trait]
impl ApiClient for MemoryApi {
    async fn fetch_catalog(&self) -> Result<Vec<AttributeDefinition>, ApiError> {
        self.tick();
        Ok(self.state.lock().catalog.clone())
    }

    async fn list_values(
        &self,
        product: &str,
        _scope: &Scope,
    ) -> Result<Vec<AttributeValue>, ApiError> {
        self.tick();
        Ok(self.stored_values(product))
    }

    async fn create_value(
        &self,
        new_value: NewAttributeValue,
    ) -> Result<AttributeValue, ApiError> {
        self.tick();
        let mut state = self.state.lock();
        if state.fail_create_for.contains(&new_value.attribute) {
            return Err(ApiError::Http {
                status: 500,
                message: format!("scripted failure for '{}'", new_value.attribute),
            });
        }
        let rows = state.values.entry(new_value.product.clone()).or_default();
        let duplicate = rows.iter().any(|v| {
            v.attribute_id == new_value.attribute
                && v.locale == new_value.locale
                && v.channel == new_value.channel
        });
        if duplicate {
            return Err(ApiError::Conflict {
                detail: Some("the fields attribute, locale, channel must make a unique set".to_string()),
            });
        }
        let value = new_value.into_value(generate_id());
        rows.push(value.clone());
        Ok(value)
    }

    async fn update_value(
        &self,
        product: &str,
        attribute: &str,
        scope: &Scope,
        update: AttributeValueUpdate,
    ) -> Result<AttributeValue, ApiError> {
        self.tick();
        let mut state = self.state.lock();
        let rows = state.values.entry(product.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|v| v.attribute_id == attribute && v.matches_scope(scope))
            .ok_or(ApiError::NotFound)?;
        row.body = update.value;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_value(
        &self,
        product: &str,
        attribute: &str,
        scope: &Scope,
    ) -> Result<(), ApiError> {
        self.tick();
        let mut state = self.state.lock();
        let rows = state.values.entry(product.to_string()).or_default();
        let before = rows.len();
        rows.retain(|v| !(v.attribute_id == attribute && v.matches_scope(scope)));
        if rows.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn list_groups(
        &self,
        _product: &str,
        _scope: &Scope,
    ) -> Result<Vec<AttributeGroup>, ApiError> {
        self.tick();
        let state = self.state.lock();
        Ok(state
            .groups
            .iter()
            .filter(|g| !state.removed_groups.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn set_family_overrides(
        &self,
        _product: &str,
        overrides: Vec<FamilyOverride>,
    ) -> Result<(), ApiError> {
        self.tick();
        let mut state = self.state.lock();
        for o in overrides {
            if o.removed {
                state.removed_groups.insert(o.attribute_group);
            } else {
                state.removed_groups.remove(&o.attribute_group);
            }
        }
        Ok(())
    }

    async fn upload_media(
        &self,
        _filename: &str,
        _bytes: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        self.tick();
        let mut state = self.state.lock();
        state.next_asset += 1;
        Ok(MediaUpload {
            asset_id: state.next_asset,
        })
    }

    async fn list_assets(&self, product: &str) -> Result<Vec<Asset>, ApiError> {
        self.tick();
        Ok(self
            .state
            .lock()
            .assets
            .get(product)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_asset(&self, product: &str, asset_id: i64) -> Result<(), ApiError> {
        self.tick();
        let mut state = self.state.lock();
        let assets = state.assets.entry(product.to_string()).or_default();
        let before = assets.len();
        assets.retain(|a| a.id != asset_id);
        if assets.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn archive_asset(&self, product: &str, asset_id: i64) -> Result<Asset, ApiError> {
        self.tick();
        let mut state = self.state.lock();
        let assets = state.assets.entry(product.to_string()).or_default();
        let asset = assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or(ApiError::NotFound)?;
        asset.archived = true;
        asset.updated_at = Utc::now();
        Ok(asset.clone())
    }

    async fn create_bundle(&self, bundle: NewBundle) -> Result<Asset, ApiError> {
        self.tick();
        let mut state = self.state.lock();
        state.next_asset += 1;
        let asset = Asset {
            id: state.next_asset,
            name: bundle.name,
            url: None,
            archived: false,
            updated_at: Utc::now(),
        };
        state
            .assets
            .entry(bundle.product)
            .or_default()
            .push(asset.clone());
        Ok(asset)
    }

    async fn download_all(&self, product: &str) -> Result<Vec<u8>, ApiError> {
        self.tick();
        let assets = self
            .state
            .lock()
            .assets
            .get(product)
            .cloned()
            .unwrap_or_default();
        Ok(serde_json::to_vec(&assets).unwrap_or_default())
    }
}
