use crate::api::{ApiClient, ApiError};
use crate::edit::Mutation;
use crate::logic::{unused_attribute_ids, validate, ValidationError, ValidationOptions};
use crate::model::{
    generate_id, Asset, AttributeCatalog, AttributeGroup, AttributeValue, AttributeValueUpdate,
    FamilyOverride, Id, NewAttributeValue, Scope, ValueBody,
};
use crate::store::{AssetSoftCache, CacheKey, ValueCache};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;

/// Who is driving the editor. Mutations are rejected client-side for
/// non-staff users, before any network round-trip.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub name: String,
    pub is_staff: bool,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    #[error("only staff users can modify product data")]
    PermissionDenied,
    #[error("confirmation required to {action}")]
    ConfirmationRequired { action: String, global_scope: bool },
    #[error("this value already exists for this attribute, locale and channel")]
    DuplicateValue,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Outcome of an "add all attributes from group" bulk action. Not
/// all-or-nothing: creates that landed stay, failures are listed.
#[derive(Debug, Default)]
pub struct BulkAddReport {
    pub created: Vec<AttributeValue>,
    pub failed: Vec<(Id, String)>,
}

impl BulkAddReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Orchestrates attribute editing for one session: the API client, the
/// optimistic value cache, and the read-only catalog passed in explicitly.
pub struct AttributeEditor<A: ApiClient> {
    api: Arc<A>,
    cache: ValueCache,
    catalog: AttributeCatalog,
    user: UserContext,
    options: ValidationOptions,
}

impl<A: ApiClient> AttributeEditor<A> {
    pub fn new(api: Arc<A>, catalog: AttributeCatalog, user: UserContext) -> Self {
        Self {
            api,
            cache: ValueCache::new(),
            catalog,
            user,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    fn key(product: &str, scope: &Scope) -> CacheKey {
        CacheKey::new(product.to_string(), scope.clone())
    }

    fn ensure_staff(&self) -> Result<(), EditorError> {
        if self.user.is_staff {
            Ok(())
        } else {
            log::info!("rejecting mutation for non-staff user '{}'", self.user.name);
            Err(EditorError::PermissionDenied)
        }
    }

    /// Fetch attribute values into the cache. A fetch superseded by a
    /// concurrent optimistic mutation is discarded; the cached state wins.
    pub async fn load_values(
        &self,
        product: &str,
        scope: &Scope,
    ) -> Result<Vec<AttributeValue>, EditorError> {
        let key = Self::key(product, scope);
        let token = self.cache.begin_fetch(&key);
        let values = self.api.list_values(product, scope).await?;
        self.cache.complete_fetch(token, values);
        Ok(self.cache.get(&key).unwrap_or_default())
    }

    /// Save one attribute value: validate, write optimistically, then PATCH
    /// when a row exists for the exact scope or POST otherwise. On rejection
    /// the cache rolls back to its pre-mutation snapshot.
    pub async fn save_value(
        &self,
        product: &str,
        attribute_id: &str,
        scope: &Scope,
        body: ValueBody,
    ) -> Result<AttributeValue, EditorError> {
        self.ensure_staff()?;
        let def = self
            .catalog
            .get(attribute_id)
            .ok_or_else(|| EditorError::UnknownAttribute(attribute_id.to_string()))?;
        let validated = validate(def, &body, &self.options)?;

        let key = Self::key(product, scope);
        let existing = self
            .cache
            .snapshot(&key)
            .into_iter()
            .find(|v| v.attribute_id == attribute_id && v.matches_scope(scope));

        let mutation = Mutation::begin(&self.cache, key.clone());
        match existing {
            Some(existing) => {
                let mut staged = existing.clone();
                staged.body = validated.clone();
                staged.updated_at = Utc::now();
                mutation.stage(staged);

                let update = AttributeValueUpdate { value: validated };
                match self.api.update_value(product, attribute_id, scope, update).await {
                    Ok(canonical) => {
                        mutation.commit(&existing.id, canonical.clone());
                        Ok(canonical)
                    }
                    Err(e) => {
                        mutation.rollback();
                        Err(self.map_mutation_error(e))
                    }
                }
            }
            None => {
                let staged_id = format!("draft-{}", generate_id());
                mutation.stage(AttributeValue {
                    id: staged_id.clone(),
                    attribute_id: attribute_id.to_string(),
                    body: validated.clone(),
                    locale: scope.locale.clone(),
                    channel: scope.channel.clone(),
                    updated_at: Utc::now(),
                });

                let new_value = NewAttributeValue {
                    attribute: attribute_id.to_string(),
                    product: product.to_string(),
                    value: validated,
                    locale: scope.locale.clone(),
                    channel: scope.channel.clone(),
                };
                match self.api.create_value(new_value).await {
                    Ok(canonical) => {
                        mutation.commit(&staged_id, canonical.clone());
                        Ok(canonical)
                    }
                    Err(e) if e.is_conflict() => {
                        mutation.rollback();
                        self.recover_conflicting_row(product, attribute_id, scope).await
                    }
                    Err(e) => {
                        mutation.rollback();
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Fallback for uniqueness conflicts: re-query and treat the existing
    /// conflicting record as the successful result.
    async fn recover_conflicting_row(
        &self,
        product: &str,
        attribute_id: &str,
        scope: &Scope,
    ) -> Result<AttributeValue, EditorError> {
        let fetched = self.api.list_values(product, scope).await?;
        let key = Self::key(product, scope);
        match fetched
            .into_iter()
            .find(|v| v.attribute_id == attribute_id && v.matches_scope(scope))
        {
            Some(existing) => {
                self.cache.upsert(&key, existing.clone());
                Ok(existing)
            }
            None => Err(EditorError::DuplicateValue),
        }
    }

    fn map_mutation_error(&self, e: ApiError) -> EditorError {
        if e.is_conflict() {
            EditorError::DuplicateValue
        } else {
            e.into()
        }
    }

    /// Delete one stored value. Destructive, so an explicit confirmation is
    /// required; deleting a global (null/null) value affects every
    /// locale/channel view and is flagged as such.
    pub async fn delete_value(
        &self,
        product: &str,
        attribute_id: &str,
        scope: &Scope,
        confirmed: bool,
    ) -> Result<(), EditorError> {
        self.ensure_staff()?;
        let key = Self::key(product, scope);
        let existing = self
            .cache
            .snapshot(&key)
            .into_iter()
            .find(|v| v.attribute_id == attribute_id && v.matches_scope(scope))
            .ok_or(EditorError::Api(ApiError::NotFound))?;

        if !confirmed {
            let action = if existing.is_global() {
                format!(
                    "delete the value of '{}' for every locale and channel",
                    attribute_id
                )
            } else {
                format!("delete the value of '{}' for {}", attribute_id, scope)
            };
            return Err(EditorError::ConfirmationRequired {
                action,
                global_scope: existing.is_global(),
            });
        }

        let mutation = Mutation::begin(&self.cache, key);
        mutation.stage_removal(&existing.id);
        match self.api.delete_value(product, attribute_id, &existing.scope()).await {
            Ok(()) => {
                mutation.commit_removal();
                Ok(())
            }
            Err(e) => {
                mutation.rollback();
                Err(e.into())
            }
        }
    }

    /// "Add all attributes from group": one create per unused attribute id,
    /// issued concurrently with no ordering guarantee, settled together.
    /// A single failure does not roll back the creates that landed.
    pub async fn add_group_attributes(
        &self,
        product: &str,
        group: &AttributeGroup,
        scope: &Scope,
    ) -> Result<BulkAddReport, EditorError> {
        self.ensure_staff()?;
        let key = Self::key(product, scope);
        let values = self.cache.snapshot(&key);
        let unused = unused_attribute_ids(group, &values, scope);

        let creates = unused.into_iter().map(|attribute_id| {
            let body = self
                .catalog
                .get(&attribute_id)
                .map(|def| ValueBody::draft(def.data_type))
                .unwrap_or(ValueBody::Text {
                    value: String::new(),
                });
            let new_value = NewAttributeValue {
                attribute: attribute_id.clone(),
                product: product.to_string(),
                value: body,
                locale: scope.locale.clone(),
                channel: scope.channel.clone(),
            };
            async move { (attribute_id, self.api.create_value(new_value).await) }
        });

        let mut report = BulkAddReport::default();
        for (attribute_id, result) in join_all(creates).await {
            match result {
                Ok(value) => {
                    self.cache.upsert(&key, value.clone());
                    report.created.push(value);
                }
                Err(e) => {
                    log::warn!(
                        "bulk add: create for '{}' in group '{}' failed: {}",
                        attribute_id,
                        group.name,
                        e
                    );
                    report.failed.push((attribute_id, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Remove an inherited group from the product, deleting its attribute
    /// values transitively. Destructive, so confirmation is required.
    pub async fn remove_group(
        &self,
        product: &str,
        group: &AttributeGroup,
        scope: &Scope,
        confirmed: bool,
    ) -> Result<(), EditorError> {
        self.ensure_staff()?;
        if !confirmed {
            return Err(EditorError::ConfirmationRequired {
                action: format!("remove group '{}' and its attribute values", group.name),
                global_scope: false,
            });
        }

        self.api
            .set_family_overrides(
                product,
                vec![FamilyOverride {
                    attribute_group: group.id.clone(),
                    removed: true,
                }],
            )
            .await?;

        let key = Self::key(product, scope);
        let owned: Vec<_> = self
            .cache
            .snapshot(&key)
            .into_iter()
            .filter(|v| group.contains(&v.attribute_id))
            .collect();
        for value in owned {
            match self
                .api
                .delete_value(product, &value.attribute_id, &value.scope())
                .await
            {
                Ok(()) | Err(ApiError::NotFound) => self.cache.remove(&key, &value.id),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Upload a media file and attach it as the value of a media attribute.
    pub async fn attach_media(
        &self,
        product: &str,
        attribute_id: &str,
        scope: &Scope,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<AttributeValue, EditorError> {
        self.ensure_staff()?;
        let upload = self.api.upload_media(filename, bytes).await?;
        self.save_value(
            product,
            attribute_id,
            scope,
            ValueBody::Media {
                asset_id: upload.asset_id,
            },
        )
        .await
    }

    /// Refresh the asset list, keeping the soft cache current. On transport
    /// failure the soft cache stands in, degraded but usable.
    pub async fn refresh_assets(
        &self,
        product: &str,
        soft_cache: &AssetSoftCache,
    ) -> Result<Vec<Asset>, EditorError> {
        match self.api.list_assets(product).await {
            Ok(assets) => {
                soft_cache.store(&assets);
                Ok(assets)
            }
            Err(e) if e.is_transient() => {
                log::warn!("asset list fetch failed, serving soft cache: {}", e);
                soft_cache.load().ok_or(EditorError::Api(e))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryApi;
    use crate::edit::{EditSession, EditState};
    use crate::model::{AttributeDefinition, DataType};
    use std::time::Instant;

    fn catalog() -> AttributeCatalog {
        AttributeCatalog::new(vec![AttributeDefinition {
            id: "color".to_string(),
            name: "Color".to_string(),
            group_id: None,
            data_type: DataType::Text,
            unit: None,
            is_mandatory: false,
            options: Vec::new(),
            validation_rule: None,
        }])
    }

    fn staff() -> UserContext {
        UserContext {
            name: "alice".to_string(),
            is_staff: true,
        }
    }

    fn text(value: &str) -> ValueBody {
        ValueBody::Text {
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn non_staff_mutation_is_rejected_without_network_calls() {
        let api = Arc::new(MemoryApi::new());
        let editor = AttributeEditor::new(
            api.clone(),
            catalog(),
            UserContext {
                name: "bob".to_string(),
                is_staff: false,
            },
        );

        let err = editor
            .save_value("p1", "color", &Scope::global(), text("red"))
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::PermissionDenied));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_value_never_reaches_the_network() {
        let api = Arc::new(MemoryApi::new());
        let editor = AttributeEditor::new(api.clone(), catalog(), staff());
        let err = editor
            .save_value("p1", "color", &Scope::global(), ValueBody::Number { value: 1.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn session_submit_payload_drives_the_editor_save_path() {
        let api = Arc::new(MemoryApi::new());
        let editor = AttributeEditor::new(api.clone(), catalog(), staff());
        let scope = Scope::global();

        let mut session = EditSession::new("color".to_string(), scope.clone(), false);
        session.begin(DataType::Text);
        session.set_draft(text("red"));
        let payload = session
            .submit(
                editor.catalog().get("color").unwrap(),
                &ValidationOptions::default(),
            )
            .unwrap();

        match editor
            .save_value("p1", &session.attribute_id, &scope, payload)
            .await
        {
            Ok(_) => session.mark_saved(Instant::now()),
            Err(e) => session.mark_error(e.to_string()),
        }
        assert!(matches!(session.state(), EditState::Saved { .. }));
        assert_eq!(api.stored_values("p1").len(), 1);
    }

    #[tokio::test]
    async fn create_conflict_recovers_existing_row() {
        let api = Arc::new(MemoryApi::new());
        api.seed_catalog(Vec::new());
        // The backend already holds a row the cache has never seen.
        api.seed_value("p1", AttributeValue {
            id: "server-row".to_string(),
            attribute_id: "color".to_string(),
            body: text("red"),
            locale: None,
            channel: None,
            updated_at: Utc::now(),
        });

        let editor = AttributeEditor::new(api.clone(), catalog(), staff());
        let saved = editor
            .save_value("p1", "color", &Scope::global(), text("blue"))
            .await
            .unwrap();
        // The conflicting record is treated as the successful result.
        assert_eq!(saved.id, "server-row");
        assert_eq!(saved.body, text("red"));
    }

    #[tokio::test]
    async fn failed_update_rolls_the_cache_back() {
        let api = Arc::new(MemoryApi::new());
        api.seed_value("p1", AttributeValue {
            id: "v1".to_string(),
            attribute_id: "color".to_string(),
            body: text("red"),
            locale: None,
            channel: None,
            updated_at: Utc::now(),
        });

        let editor = AttributeEditor::new(api.clone(), catalog(), staff());
        editor.load_values("p1", &Scope::global()).await.unwrap();
        let before = editor.cache().snapshot(&CacheKey::new("p1".to_string(), Scope::global()));

        // Remove the row behind the editor's back so the PATCH fails.
        api.delete_value("p1", "color", &Scope::global()).await.unwrap();

        let err = editor
            .save_value("p1", "color", &Scope::global(), text("blue"))
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Api(ApiError::NotFound)));
        let after = editor.cache().snapshot(&CacheKey::new("p1".to_string(), Scope::global()));
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn deleting_global_value_requires_confirmation_and_spares_scoped_rows() {
        let api = Arc::new(MemoryApi::new());
        for (id, locale) in [("g", None), ("en", Some("en")), ("fr", Some("fr"))] {
            api.seed_value("p1", AttributeValue {
                id: id.to_string(),
                attribute_id: "color".to_string(),
                body: text(id),
                locale: locale.map(str::to_string),
                channel: None,
                updated_at: Utc::now(),
            });
        }

        let editor = AttributeEditor::new(api.clone(), catalog(), staff());
        editor.load_values("p1", &Scope::global()).await.unwrap();

        let err = editor
            .delete_value("p1", "color", &Scope::global(), false)
            .await
            .unwrap_err();
        match err {
            EditorError::ConfirmationRequired { global_scope, .. } => assert!(global_scope),
            other => panic!("expected confirmation gate, got {:?}", other),
        }

        editor
            .delete_value("p1", "color", &Scope::global(), true)
            .await
            .unwrap();
        let remaining = api.stored_values("p1");
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|v| v.locale.is_some()));
    }
}
