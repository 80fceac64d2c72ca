// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle shared by every widget kind.
//!
//! Concrete services supply three hooks ([`WidgetService::build_entity`],
//! [`WidgetService::cleanup`], [`WidgetService::transform`]) and inherit
//! create, fetch, ownership verification and delete.

use async_trait::async_trait;
use nostalgic_core::{
    NostalgicError, PublicId, Result, ServiceKind, WebhookPayload, WidgetEntity, WidgetMeta, keys,
};
use nostalgic_security::{
    hash_owner_token, validate_owner_token, validate_webhook_url, verify_owner_token,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::ids::{canonicalize_url, generate_public_id};
use crate::policy::TITLE_MAX_LEN;

const ID_ALLOCATION_ATTEMPTS: usize = 5;

/// Returned for every ownership failure so callers cannot tell a missing
/// widget from a wrong token.
const OWNERSHIP_ERROR: &str = "invalid token or entity not found";

#[async_trait]
pub trait WidgetService: Send + Sync {
    type Entity: WidgetEntity;
    type CreateParams: Send + 'static;
    type View: Serialize + Send;

    fn context(&self) -> &ServiceContext;

    /// Construct a fresh entity. Must not touch storage.
    fn build_entity(&self, meta: WidgetMeta, params: Self::CreateParams) -> Result<Self::Entity>;

    /// Remove the kind-specific child rows of a widget being deleted.
    async fn cleanup(&self, entity: &Self::Entity) -> Result<()>;

    /// Public view of a widget.
    async fn transform(&self, entity: &Self::Entity) -> Result<Self::View>;

    fn kind(&self) -> ServiceKind {
        Self::Entity::KIND
    }

    fn entity_key(&self, id: &PublicId) -> String {
        keys::entity(Self::Entity::KIND, id)
    }

    async fn create(
        &self,
        url: &str,
        token: &str,
        params: Self::CreateParams,
    ) -> Result<Self::Entity> {
        let ctx = self.context();
        let kind = self.kind();
        validate_owner_token(token)?;
        let url = canonicalize_url(url)?;

        let exists = ctx
            .repos
            .url_mappings
            .get_id(kind, &url)
            .await
            .map_err(|e| creation_failed(kind, e))?;
        if exists.is_some() {
            return Err(NostalgicError::validation(format!(
                "{kind} already exists for this url"
            )));
        }

        let id = self.allocate_id(&url).await?;
        let meta = WidgetMeta {
            id: id.clone(),
            url: url.clone(),
            created: ctx.now(),
        };
        let entity = self.build_entity(meta, params)?;

        let owner_key = keys::owner(kind, &id);
        ctx.repos
            .entities
            .save(&owner_key, &hash_owner_token(token))
            .await
            .map_err(|e| creation_failed(kind, e))?;

        match ctx.repos.url_mappings.reserve(kind, &url, id.as_str()).await {
            Ok(true) => {}
            Ok(false) => {
                log_compensation("owner hash", &id, ctx.repos.entities.delete(&owner_key).await);
                return Err(NostalgicError::validation(format!(
                    "{kind} already exists for this url"
                )));
            }
            Err(e) => {
                log_compensation("owner hash", &id, ctx.repos.entities.delete(&owner_key).await);
                return Err(creation_failed(kind, e));
            }
        }

        if let Err(e) = self.save(&entity).await {
            log_compensation("url mapping", &id, ctx.repos.url_mappings.remove(kind, &url).await);
            log_compensation("owner hash", &id, ctx.repos.entities.delete(&owner_key).await);
            return Err(creation_failed(kind, e));
        }

        info!(kind = %kind, widget_id = %id, url = %url, "widget created");
        Ok(entity)
    }

    /// Draw ids until one is unused.
    async fn allocate_id(&self, canonical_url: &str) -> Result<PublicId> {
        for _ in 0..ID_ALLOCATION_ATTEMPTS {
            let id = generate_public_id(canonical_url)?;
            let taken = self
                .context()
                .repos
                .entities
                .exists(&self.entity_key(&id))
                .await
                .map_err(|e| creation_failed(self.kind(), e))?;
            if !taken {
                return Ok(id);
            }
        }
        Err(NostalgicError::Internal("could not allocate a widget id".into()))
    }

    async fn load(&self, id: &PublicId) -> Result<Option<Self::Entity>> {
        let raw = self.context().repos.entities.get(&self.entity_key(id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: &PublicId) -> Result<Self::Entity> {
        self.load(id)
            .await?
            .ok_or_else(|| NostalgicError::not_found(format!("{} not found", self.kind())))
    }

    async fn get_view(&self, id: &PublicId) -> Result<Self::View> {
        let entity = self.get_by_id(id).await?;
        self.transform(&entity).await
    }

    async fn save(&self, entity: &Self::Entity) -> Result<()> {
        let json = serde_json::to_string(entity)?;
        self.context()
            .repos
            .entities
            .save(&self.entity_key(entity.id()), &json)
            .await
    }

    /// Resolve `url` to its widget and check `token` against the stored hash.
    async fn verify_ownership(&self, url: &str, token: &str) -> Result<Self::Entity> {
        let ctx = self.context();
        let kind = self.kind();
        let denied = || NostalgicError::validation(OWNERSHIP_ERROR);

        let url = canonicalize_url(url)?;
        let Some(raw_id) = ctx.repos.url_mappings.get_id(kind, &url).await? else {
            return Err(denied());
        };
        let id = PublicId::parse(&raw_id).map_err(|_| denied())?;
        let Some(stored) = ctx.repos.entities.get(&keys::owner(kind, &id)).await? else {
            return Err(denied());
        };
        if !verify_owner_token(token, &stored) {
            return Err(denied());
        }
        self.load(&id).await?.ok_or_else(denied)
    }

    async fn delete(&self, url: &str, token: &str) -> Result<()> {
        let entity = self.verify_ownership(url, token).await?;
        self.purge(&entity).await
    }

    /// Remove a widget and everything hanging off it.
    ///
    /// Child-row cleanup is best effort; the entity, owner hash and URL
    /// mapping are always removed.
    async fn purge(&self, entity: &Self::Entity) -> Result<()> {
        let ctx = self.context();
        let kind = self.kind();
        let id = entity.id();
        let key = self.entity_key(id);

        if let Err(e) = self.cleanup(entity).await {
            warn!(kind = %kind, widget_id = %id, error = %e, "widget cleanup incomplete");
        }
        if let Err(e) = ctx.repos.markers.purge_widget(&key).await {
            warn!(kind = %kind, widget_id = %id, error = %e, "marker cleanup incomplete");
        }
        ctx.repos.entities.delete(&keys::owner(kind, id)).await?;
        ctx.repos.entities.delete(&key).await?;
        ctx.repos.url_mappings.remove(kind, entity.url()).await?;

        info!(kind = %kind, widget_id = %id, "widget deleted");
        Ok(())
    }

    /// Queue a webhook if the widget has one configured.
    fn notify(&self, entity: &Self::Entity, event: &str, data: serde_json::Value) {
        let Some(target) = entity.webhook_url() else {
            return;
        };
        let ctx = self.context();
        ctx.notifier.notify(
            target,
            WebhookPayload {
                event: event.to_string(),
                timestamp: ctx.now(),
                service_id: entity.id().to_string(),
                url: entity.url().to_string(),
                data,
            },
        );
    }
}

/// Owner-supplied settings changes common to every kind.
///
/// `None` leaves a field unchanged; an empty `webhook_url` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub title: Option<String>,
    pub webhook_url: Option<String>,
}

impl SettingsUpdate {
    pub(crate) fn apply(
        self,
        ctx: &ServiceContext,
        title: &mut Option<String>,
        webhook_url: &mut Option<String>,
    ) -> Result<()> {
        if let Some(raw) = self.title {
            *title = normalize_title(Some(raw))?;
        }
        if let Some(raw) = self.webhook_url {
            *webhook_url = normalize_webhook_url(ctx, Some(raw))?;
        }
        Ok(())
    }
}

pub(crate) fn normalize_title(raw: Option<String>) -> Result<Option<String>> {
    let Some(title) = raw.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(NostalgicError::validation(format!(
            "title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(Some(title))
}

pub(crate) fn normalize_webhook_url(
    ctx: &ServiceContext,
    raw: Option<String>,
) -> Result<Option<String>> {
    let Some(target) = raw.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    validate_webhook_url(&target, &ctx.policy.allowed_private_ips)?;
    Ok(Some(target))
}

/// Hide storage detail behind a generic message for user-triggered creates.
fn creation_failed(kind: ServiceKind, err: NostalgicError) -> NostalgicError {
    if err.is_client_error() {
        return err;
    }
    warn!(kind = %kind, error = %err, "widget creation failed");
    NostalgicError::validation(format!("failed to create {kind}"))
}

/// Log a failed undo step; the inconsistency is left for a later reconcile.
/// Settle independent cleanup steps that have all been attempted.
///
/// Every failure is logged; the first one is returned.
pub(crate) fn settle_cleanup<const N: usize>(
    widget: &PublicId,
    steps: [(&str, Result<()>); N],
) -> Result<()> {
    let mut first = Ok(());
    for (step, result) in steps {
        if let Err(e) = result {
            warn!(widget_id = %widget, step, error = %e, "cleanup step failed");
            if first.is_ok() {
                first = Err(e);
            }
        }
    }
    first
}

pub(crate) fn log_compensation<T>(step: &str, widget: &PublicId, result: Result<T>) {
    if let Err(e) = result {
        warn!(widget_id = %widget, step, error = %e, "compensation failed");
    }
}
