// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Like button.
//!
//! Each visitor has one marker per calendar day whose value is `liked` or
//! `unliked`. Unliking rewrites the value instead of deleting the row, so the
//! first interaction of the day occupies the slot until midnight.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nostalgic_core::traits::MarkerKey;
use nostalgic_core::{
    BasicSettings, LikeEntity, PublicId, Result, VisitorHash, WidgetEntity, WidgetMeta,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{
    SettingsUpdate, WidgetService, log_compensation, normalize_title, normalize_webhook_url,
};
use crate::context::ServiceContext;
use crate::numeric::NumericWidgetService;

const LIKE_MARKER: &str = "like";
const LIKED: &str = "liked";
const UNLIKED: &str = "unliked";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCreateParams {
    pub title: Option<String>,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeData {
    pub id: PublicId,
    pub url: String,
    pub total: u64,
    pub user_liked: bool,
    pub last_like: Option<DateTime<Utc>>,
}

pub struct LikeService {
    ctx: Arc<ServiceContext>,
}

impl LikeService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    fn marker(&self, id: &PublicId, visitor: &VisitorHash, now: DateTime<Utc>) -> MarkerKey {
        MarkerKey {
            widget: self.entity_key(id),
            actor: visitor.as_str().to_string(),
            marker_type: LIKE_MARKER.to_string(),
            partition: self.ctx.calendar.partition(now),
        }
    }

    /// Flip the visitor's like state for today.
    pub async fn toggle(&self, id: &PublicId, visitor: &VisitorHash) -> Result<LikeData> {
        let ctx = &self.ctx;
        let markers = &ctx.repos.markers;
        let now = ctx.now();
        let mut entity = self.get_by_id(id).await?;
        let marker = self.marker(id, visitor, now);

        match markers.get(&marker, now).await?.as_deref() {
            None => {
                let acquired = markers
                    .try_acquire(&marker, LIKED, ctx.calendar.next_midnight(now), now)
                    .await?;
                if !acquired {
                    debug!(widget_id = %id, "concurrent first like, keeping current state");
                    return self.data_for(&entity, Some(visitor)).await;
                }
                self.apply_like(&mut entity, &marker, now, Undo::RemoveMarker).await
            }
            Some(LIKED) => {
                if !markers.compare_and_set(&marker, LIKED, UNLIKED, now).await? {
                    return self.data_for(&entity, Some(visitor)).await;
                }
                self.apply_unlike(&mut entity, &marker, now).await
            }
            Some(UNLIKED) => {
                if !markers.compare_and_set(&marker, UNLIKED, LIKED, now).await? {
                    return self.data_for(&entity, Some(visitor)).await;
                }
                self.apply_like(&mut entity, &marker, now, Undo::RestoreUnliked).await
            }
            Some(other) => {
                debug!(widget_id = %id, value = other, "unexpected like marker value");
                self.data_for(&entity, Some(visitor)).await
            }
        }
    }

    async fn apply_like(
        &self,
        entity: &mut LikeEntity,
        marker: &MarkerKey,
        now: DateTime<Utc>,
        undo: Undo,
    ) -> Result<LikeData> {
        let id = entity.id().clone();
        let total = match self.increment_value(&id, 1).await {
            Ok(total) => total,
            Err(e) => {
                self.undo_marker(&id, marker, undo).await;
                return Err(e);
            }
        };

        entity.total_likes = total;
        entity.last_like = Some(now);
        if let Err(e) = self.save(entity).await {
            log_compensation("total", &id, self.decrement_value(&id, 1).await);
            self.undo_marker(&id, marker, undo).await;
            return Err(e);
        }

        let data = self.view(entity, total, true);
        self.notify(entity, "like.like", serde_json::to_value(&data)?);
        Ok(data)
    }

    async fn apply_unlike(
        &self,
        entity: &mut LikeEntity,
        marker: &MarkerKey,
        now: DateTime<Utc>,
    ) -> Result<LikeData> {
        let id = entity.id().clone();
        let markers = &self.ctx.repos.markers;
        let total = match self.decrement_value(&id, 1).await {
            Ok(total) => total,
            Err(e) => {
                log_compensation("like marker", &id, markers.set_value(marker, LIKED).await);
                return Err(e);
            }
        };

        entity.total_likes = total;
        entity.last_like = Some(now);
        if let Err(e) = self.save(entity).await {
            log_compensation("total", &id, self.increment_value(&id, 1).await);
            log_compensation("like marker", &id, markers.set_value(marker, LIKED).await);
            return Err(e);
        }

        let data = self.view(entity, total, false);
        self.notify(entity, "like.unlike", serde_json::to_value(&data)?);
        Ok(data)
    }

    async fn undo_marker(&self, id: &PublicId, marker: &MarkerKey, undo: Undo) {
        let markers = &self.ctx.repos.markers;
        match undo {
            Undo::RemoveMarker => {
                log_compensation("like marker", id, markers.remove(marker).await);
            }
            Undo::RestoreUnliked => {
                log_compensation("like marker", id, markers.set_value(marker, UNLIKED).await);
            }
        }
    }

    /// Current state, with `userLiked` reflecting the visitor's marker for today.
    pub async fn get(&self, id: &PublicId, visitor: Option<&VisitorHash>) -> Result<LikeData> {
        let entity = self.get_by_id(id).await?;
        self.data_for(&entity, visitor).await
    }

    pub async fn update_settings(
        &self,
        url: &str,
        token: &str,
        update: SettingsUpdate,
    ) -> Result<LikeEntity> {
        let mut entity = self.verify_ownership(url, token).await?;
        let settings = &mut entity.settings;
        update.apply(&self.ctx, &mut settings.title, &mut settings.webhook_url)?;
        self.save(&entity).await?;
        Ok(entity)
    }

    async fn data_for(&self, entity: &LikeEntity, visitor: Option<&VisitorHash>) -> Result<LikeData> {
        let total = self.current_value(entity.id()).await?;
        let user_liked = match visitor {
            Some(visitor) => {
                let now = self.ctx.now();
                let marker = self.marker(entity.id(), visitor, now);
                self.ctx.repos.markers.get(&marker, now).await?.as_deref() == Some(LIKED)
            }
            None => false,
        };
        Ok(self.view(entity, total, user_liked))
    }

    fn view(&self, entity: &LikeEntity, total: u64, user_liked: bool) -> LikeData {
        LikeData {
            id: entity.id().clone(),
            url: entity.url().to_string(),
            total,
            user_liked,
            last_like: entity.last_like,
        }
    }
}

/// How to roll back the marker when a like fails after the marker moved.
#[derive(Debug, Clone, Copy)]
enum Undo {
    RemoveMarker,
    RestoreUnliked,
}

#[async_trait]
impl WidgetService for LikeService {
    type Entity = LikeEntity;
    type CreateParams = LikeCreateParams;
    type View = LikeData;

    fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    fn build_entity(&self, meta: WidgetMeta, params: LikeCreateParams) -> Result<LikeEntity> {
        Ok(LikeEntity {
            meta,
            settings: BasicSettings {
                title: normalize_title(params.title)?,
                webhook_url: normalize_webhook_url(&self.ctx, params.webhook_url)?,
            },
            total_likes: 0,
            last_like: None,
        })
    }

    async fn cleanup(&self, entity: &LikeEntity) -> Result<()> {
        self.ctx.repos.counters.delete(&self.total_key(entity.id())).await
    }

    async fn transform(&self, entity: &LikeEntity) -> Result<LikeData> {
        self.data_for(entity, None).await
    }
}

impl NumericWidgetService for LikeService {
    fn apply_total(entity: &mut LikeEntity, total: u64) {
        entity.total_likes = total;
    }
}
