// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paginated guestbook with self-service moderation.
//!
//! A poster's visitor hash is stored on the message and doubles as the edit
//! token returned from [`BbsService::post`]; no other credential exists for
//! anonymous authors.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nostalgic_core::traits::{ListOrder, MarkerKey};
use nostalgic_core::{
    BbsEntity, BbsMessage, BbsSettings, NostalgicError, PublicId, Result, SelectDefinition,
    VisitorHash, WidgetEntity, WidgetMeta, keys,
};
use nostalgic_security::constant_time_eq;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::base::{
    SettingsUpdate, WidgetService, log_compensation, normalize_title, normalize_webhook_url,
    settle_cleanup,
};
use crate::context::ServiceContext;
use crate::policy::{MAX_BBS_SELECTS, MAX_SELECT_OPTIONS};

const POST_MARKER: &str = "post";
const COOLDOWN_PARTITION: &str = "cooldown";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsCreateParams {
    pub title: Option<String>,
    pub webhook_url: Option<String>,
    pub messages_per_page: Option<u32>,
    pub max_messages: Option<u32>,
    #[serde(default)]
    pub selects: Vec<SelectDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub author: Option<String>,
    pub message: String,
    /// Positional values for the widget's selects; `None` leaves one unset.
    #[serde(default)]
    pub selects: Vec<Option<String>>,
}

/// Replacement content for an existing message. Omitted author or selects are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEdit {
    pub author: Option<String>,
    pub message: String,
    pub selects: Option<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsSettingsUpdate {
    #[serde(flatten)]
    pub common: SettingsUpdate,
    pub messages_per_page: Option<u32>,
    pub max_messages: Option<u32>,
    pub selects: Option<Vec<SelectDefinition>>,
}

/// A message as shown to readers. The author hash is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsMessageView {
    pub id: String,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub selects: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
}

impl From<BbsMessage> for BbsMessageView {
    fn from(m: BbsMessage) -> Self {
        Self {
            id: m.id,
            author: m.author,
            message: m.message,
            timestamp: m.timestamp,
            selects: m.selects,
            edited: m.edited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total_messages: u64,
    pub messages_per_page: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    /// Clamp `requested` into the available pages (page 1 when empty).
    pub fn new(total_messages: u64, messages_per_page: u32, requested: Option<u32>) -> Self {
        let per_page = messages_per_page.max(1);
        let total_pages = u32::try_from(total_messages.div_ceil(u64::from(per_page)))
            .unwrap_or(u32::MAX);
        let page = requested.unwrap_or(1).clamp(1, total_pages.max(1));
        Self {
            page,
            total_pages,
            total_messages,
            messages_per_page: per_page,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Inclusive oldest-first index range of the page.
    fn index_range(&self) -> (i64, i64) {
        let per_page = i64::from(self.messages_per_page);
        let start = i64::from(self.page - 1) * per_page;
        (start, start + per_page - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsData {
    pub id: PublicId,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub selects: Vec<SelectDefinition>,
    pub messages: Vec<BbsMessageView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOutcome {
    pub message_id: String,
    /// The poster's capability for later edit and delete.
    pub edit_token: String,
    pub data: BbsData,
}

pub struct BbsService {
    ctx: Arc<ServiceContext>,
}

impl BbsService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn post(
        &self,
        id: &PublicId,
        visitor: &VisitorHash,
        request: PostRequest,
    ) -> Result<PostOutcome> {
        let ctx = &self.ctx;
        let repos = &ctx.repos;
        let now = ctx.now();
        let mut entity = self.get_by_id(id).await?;

        let author = match request.author {
            Some(a) if !a.trim().is_empty() => a,
            _ => ctx.policy.bbs.default_author.clone(),
        };
        let (author, message) = self.validate_text(&author, &request.message)?;
        let selects = validate_select_values(&entity.settings.selects, &request.selects)?;
        self.check_filter(&author, &message)?;

        let cooldown = MarkerKey {
            widget: self.entity_key(id),
            actor: visitor.as_str().to_string(),
            marker_type: POST_MARKER.to_string(),
            partition: COOLDOWN_PARTITION.to_string(),
        };
        let expires = now + ctx.policy.bbs.post_cooldown;
        if !repos.markers.try_acquire(&cooldown, "1", expires, now).await? {
            return Err(NostalgicError::validation("please wait before posting again"));
        }

        let message_id = match repos.counters.increment(&keys::bbs_sequence(id), 1).await {
            Ok(seq) => seq.to_string(),
            Err(e) => {
                log_compensation("cooldown", id, repos.markers.remove(&cooldown).await);
                return Err(e);
            }
        };
        let stored = BbsMessage {
            id: message_id.clone(),
            author,
            message,
            timestamp: now,
            selects,
            author_hash: visitor.as_str().to_string(),
            edited: None,
        };

        let list_key = keys::bbs_messages(id);
        let pushed = async {
            let json = serde_json::to_string(&stored)?;
            repos.lists.push(&list_key, &message_id, &json).await
        }
        .await;
        let length = match pushed {
            Ok(length) => length,
            Err(e) => {
                log_compensation("cooldown", id, repos.markers.remove(&cooldown).await);
                return Err(e);
            }
        };

        entity.total_messages = length.min(u64::from(entity.settings.max_messages));
        entity.last_message = Some(now);
        if let Err(e) = self.save(&entity).await {
            log_compensation("message", id, repos.lists.remove_item(&list_key, &message_id).await);
            log_compensation("cooldown", id, repos.markers.remove(&cooldown).await);
            return Err(e);
        }

        self.enforce_cap(&entity).await;

        self.notify(
            &entity,
            "bbs.post",
            serde_json::json!({
                "messageId": message_id,
                "author": stored.author,
                "message": stored.message,
            }),
        );
        Ok(PostOutcome {
            message_id,
            edit_token: stored.author_hash,
            data: self.data_for(&entity, Some(u32::MAX)).await?,
        })
    }

    /// Author edit, authorized by the edit token returned from `post`.
    pub async fn edit_message_by_id(
        &self,
        id: &PublicId,
        message_id: &str,
        edit_token: &str,
        edit: MessageEdit,
    ) -> Result<BbsMessageView> {
        let entity = self.get_by_id(id).await?;
        let stored = self.load_message(&entity, message_id).await?;
        check_edit_token(&stored, edit_token)?;
        self.apply_edit(&entity, stored, edit).await
    }

    /// Author delete, authorized by the edit token returned from `post`.
    pub async fn delete_message_by_id(
        &self,
        id: &PublicId,
        message_id: &str,
        edit_token: &str,
    ) -> Result<BbsData> {
        let entity = self.get_by_id(id).await?;
        let stored = self.load_message(&entity, message_id).await?;
        check_edit_token(&stored, edit_token)?;
        self.remove_message(entity, message_id).await
    }

    pub async fn edit_message(
        &self,
        url: &str,
        token: &str,
        message_id: &str,
        edit: MessageEdit,
    ) -> Result<BbsMessageView> {
        let entity = self.verify_ownership(url, token).await?;
        let stored = self.load_message(&entity, message_id).await?;
        self.apply_edit(&entity, stored, edit).await
    }

    pub async fn delete_message(&self, url: &str, token: &str, message_id: &str) -> Result<BbsData> {
        let entity = self.verify_ownership(url, token).await?;
        self.remove_message(entity, message_id).await
    }

    pub async fn clear(&self, url: &str, token: &str) -> Result<BbsData> {
        let mut entity = self.verify_ownership(url, token).await?;
        self.ctx
            .repos
            .lists
            .clear(&keys::bbs_messages(entity.id()))
            .await?;
        entity.total_messages = 0;
        self.save(&entity).await?;
        info!(widget_id = %entity.id(), "bbs cleared");
        self.data_for(&entity, None).await
    }

    /// One page, oldest first; the highest page holds the newest messages.
    pub async fn get(&self, id: &PublicId, page: Option<u32>) -> Result<BbsData> {
        let entity = self.get_by_id(id).await?;
        self.data_for(&entity, page).await
    }

    pub async fn update_settings(
        &self,
        url: &str,
        token: &str,
        update: BbsSettingsUpdate,
    ) -> Result<BbsEntity> {
        let mut entity = self.verify_ownership(url, token).await?;
        let settings = &mut entity.settings;
        update
            .common
            .apply(&self.ctx, &mut settings.title, &mut settings.webhook_url)?;
        if let Some(per_page) = update.messages_per_page {
            settings.messages_per_page = self.validate_page_size(per_page)?;
        }
        if let Some(max) = update.max_messages {
            settings.max_messages = self.validate_max_messages(max)?;
        }
        if let Some(selects) = update.selects {
            settings.selects = validate_select_definitions(selects)?;
        }

        self.enforce_cap(&entity).await;
        entity.total_messages = self
            .ctx
            .repos
            .lists
            .length(&keys::bbs_messages(entity.id()))
            .await?;
        self.save(&entity).await?;
        Ok(entity)
    }

    async fn load_message(&self, entity: &BbsEntity, message_id: &str) -> Result<BbsMessage> {
        let raw = self
            .ctx
            .repos
            .lists
            .get_item(&keys::bbs_messages(entity.id()), message_id)
            .await?
            .ok_or_else(|| NostalgicError::not_found("message not found"))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn apply_edit(
        &self,
        entity: &BbsEntity,
        mut stored: BbsMessage,
        edit: MessageEdit,
    ) -> Result<BbsMessageView> {
        let author = match edit.author {
            Some(a) if !a.trim().is_empty() => a,
            Some(_) => self.ctx.policy.bbs.default_author.clone(),
            None => stored.author.clone(),
        };
        let (author, message) = self.validate_text(&author, &edit.message)?;
        if let Some(values) = edit.selects {
            stored.selects = validate_select_values(&entity.settings.selects, &values)?;
        }
        self.check_filter(&author, &message)?;

        stored.author = author;
        stored.message = message;
        stored.edited = Some(self.ctx.now());
        let json = serde_json::to_string(&stored)?;
        let updated = self
            .ctx
            .repos
            .lists
            .update_item(&keys::bbs_messages(entity.id()), &stored.id, &json)
            .await?;
        if !updated {
            return Err(NostalgicError::not_found("message not found"));
        }

        self.notify(
            entity,
            "bbs.edit",
            serde_json::json!({ "messageId": stored.id, "message": stored.message }),
        );
        Ok(stored.into())
    }

    async fn remove_message(&self, mut entity: BbsEntity, message_id: &str) -> Result<BbsData> {
        let lists = &self.ctx.repos.lists;
        let list_key = keys::bbs_messages(entity.id());
        if !lists.remove_item(&list_key, message_id).await? {
            return Err(NostalgicError::not_found("message not found"));
        }
        entity.total_messages = lists.length(&list_key).await?;
        self.save(&entity).await?;

        self.notify(&entity, "bbs.delete", serde_json::json!({ "messageId": message_id }));
        self.data_for(&entity, None).await
    }

    /// Trimmed author and message, checked against the configured lengths.
    fn validate_text(&self, author: &str, message: &str) -> Result<(String, String)> {
        let policy = &self.ctx.policy.bbs;
        let message = message.trim();
        if message.is_empty() {
            return Err(NostalgicError::validation("message is required"));
        }
        if message.chars().count() > policy.message_max_len {
            return Err(NostalgicError::validation(format!(
                "message must be at most {} characters",
                policy.message_max_len
            )));
        }
        let author = author.trim();
        if author.chars().count() > policy.author_max_len {
            return Err(NostalgicError::validation(format!(
                "author must be at most {} characters",
                policy.author_max_len
            )));
        }
        Ok((author.to_string(), message.to_string()))
    }

    fn check_filter(&self, author: &str, message: &str) -> Result<()> {
        let filter = &self.ctx.filter;
        if filter.is_allowed(author) && filter.is_allowed(message) {
            return Ok(());
        }
        Err(NostalgicError::validation("message contains prohibited content"))
    }

    fn validate_page_size(&self, per_page: u32) -> Result<u32> {
        let max = self.ctx.policy.bbs.max_messages_per_page;
        if !(1..=max).contains(&per_page) {
            return Err(NostalgicError::validation(format!(
                "messagesPerPage must be between 1 and {max}"
            )));
        }
        Ok(per_page)
    }

    fn validate_max_messages(&self, max: u32) -> Result<u32> {
        let cap = self.ctx.policy.bbs.max_messages_cap;
        if !(1..=cap).contains(&max) {
            return Err(NostalgicError::validation(format!(
                "maxMessages must be between 1 and {cap}"
            )));
        }
        Ok(max)
    }

    /// Drop the oldest messages until the cap holds.
    async fn enforce_cap(&self, entity: &BbsEntity) {
        let list_key = keys::bbs_messages(entity.id());
        let keep = i64::from(entity.settings.max_messages);
        match self.ctx.repos.lists.trim(&list_key, 0, keep - 1).await {
            Ok(0) => {}
            Ok(removed) => debug!(widget_id = %entity.id(), removed, "bbs trimmed to cap"),
            Err(e) => warn!(widget_id = %entity.id(), error = %e, "bbs trim failed; next post retries"),
        }
    }

    async fn data_for(&self, entity: &BbsEntity, page: Option<u32>) -> Result<BbsData> {
        let lists = &self.ctx.repos.lists;
        let list_key = keys::bbs_messages(entity.id());
        let total = lists.length(&list_key).await?;
        let pagination = Pagination::new(total, entity.settings.messages_per_page, page);

        let messages = if total == 0 {
            Vec::new()
        } else {
            let (start, stop) = pagination.index_range();
            lists
                .range(&list_key, start, stop, ListOrder::OldestFirst)
                .await?
                .into_iter()
                .map(|item| serde_json::from_str::<BbsMessage>(&item.value).map(BbsMessageView::from))
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(BbsData {
            id: entity.id().clone(),
            url: entity.url().to_string(),
            title: entity.settings.title.clone(),
            selects: entity.settings.selects.clone(),
            messages,
            pagination,
        })
    }
}

fn check_edit_token(stored: &BbsMessage, edit_token: &str) -> Result<()> {
    if constant_time_eq(edit_token.as_bytes(), stored.author_hash.as_bytes()) {
        Ok(())
    } else {
        Err(NostalgicError::validation("invalid edit token"))
    }
}

fn validate_select_definitions(selects: Vec<SelectDefinition>) -> Result<Vec<SelectDefinition>> {
    if selects.len() > MAX_BBS_SELECTS {
        return Err(NostalgicError::validation(format!(
            "at most {MAX_BBS_SELECTS} selects are allowed"
        )));
    }
    selects
        .into_iter()
        .map(|select| {
            let label = select.label.trim().to_string();
            let options: Vec<String> = select
                .options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if label.is_empty() || options.is_empty() {
                return Err(NostalgicError::validation(
                    "each select needs a label and at least one option",
                ));
            }
            if options.len() > MAX_SELECT_OPTIONS {
                return Err(NostalgicError::validation(format!(
                    "a select may have at most {MAX_SELECT_OPTIONS} options"
                )));
            }
            Ok(SelectDefinition { label, options })
        })
        .collect()
}

/// Align submitted values with the configured selects; each value must be one of its options.
fn validate_select_values(
    definitions: &[SelectDefinition],
    values: &[Option<String>],
) -> Result<Vec<Option<String>>> {
    let normalized = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    if values.iter().skip(definitions.len()).any(|v| normalized(v).is_some()) {
        return Err(NostalgicError::validation("unknown select"));
    }
    definitions
        .iter()
        .enumerate()
        .map(|(i, def)| match values.get(i).and_then(normalized) {
            Some(value) if !def.options.contains(&value) => Err(NostalgicError::validation(
                format!("invalid option for {}", def.label),
            )),
            value => Ok(value),
        })
        .collect()
}

#[async_trait]
impl WidgetService for BbsService {
    type Entity = BbsEntity;
    type CreateParams = BbsCreateParams;
    type View = BbsData;

    fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    fn build_entity(&self, meta: WidgetMeta, params: BbsCreateParams) -> Result<BbsEntity> {
        let policy = &self.ctx.policy.bbs;
        Ok(BbsEntity {
            meta,
            settings: BbsSettings {
                title: normalize_title(params.title)?,
                webhook_url: normalize_webhook_url(&self.ctx, params.webhook_url)?,
                messages_per_page: self.validate_page_size(
                    params
                        .messages_per_page
                        .unwrap_or(policy.default_messages_per_page),
                )?,
                max_messages: self
                    .validate_max_messages(params.max_messages.unwrap_or(policy.default_max_messages))?,
                selects: validate_select_definitions(params.selects)?,
            },
            total_messages: 0,
            last_message: None,
        })
    }

    async fn cleanup(&self, entity: &BbsEntity) -> Result<()> {
        let repos = &self.ctx.repos;
        let messages = repos.lists.clear(&keys::bbs_messages(entity.id())).await;
        let sequence = repos.counters.delete(&keys::bbs_sequence(entity.id())).await;
        settle_cleanup(entity.id(), [("messages", messages), ("sequence", sequence)])
    }

    async fn transform(&self, entity: &BbsEntity) -> Result<BbsData> {
        self.data_for(entity, None).await
    }
}
