// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hit counter with one count per visitor per calendar day.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use nostalgic_core::traits::MarkerKey;
use nostalgic_core::{
    BasicSettings, CounterEntity, CounterWindow, PublicId, Result, VisitorHash, WidgetEntity,
    WidgetMeta,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{
    SettingsUpdate, WidgetService, log_compensation, normalize_title, normalize_webhook_url,
    settle_cleanup,
};
use crate::context::ServiceContext;
use crate::numeric::NumericWidgetService;

const VISIT_MARKER: &str = "visit";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterCreateParams {
    pub title: Option<String>,
    pub webhook_url: Option<String>,
}

/// Counter numbers as shown to visitors. Windowed figures are summed from
/// the daily aggregates at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterData {
    pub id: PublicId,
    pub url: String,
    pub total: u64,
    pub today: u64,
    pub yesterday: u64,
    pub week: u64,
    pub month: u64,
    pub last_visit: Option<DateTime<Utc>>,
}

impl CounterData {
    pub fn value(&self, window: CounterWindow) -> u64 {
        match window {
            CounterWindow::Total => self.total,
            CounterWindow::Today => self.today,
            CounterWindow::Yesterday => self.yesterday,
            CounterWindow::Week => self.week,
            CounterWindow::Month => self.month,
        }
    }
}

pub struct CounterService {
    ctx: Arc<ServiceContext>,
}

impl CounterService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Count a visit. Repeat visits on the same day return the current data unchanged.
    pub async fn increment(&self, id: &PublicId, visitor: &VisitorHash) -> Result<CounterData> {
        let ctx = &self.ctx;
        let repos = &ctx.repos;
        let now = ctx.now();
        let key = self.entity_key(id);
        let marker = MarkerKey {
            widget: key.clone(),
            actor: visitor.as_str().to_string(),
            marker_type: VISIT_MARKER.to_string(),
            partition: ctx.calendar.partition(now),
        };

        let first_today = repos
            .markers
            .try_acquire(&marker, "1", ctx.calendar.next_midnight(now), now)
            .await?;
        if !first_today {
            debug!(widget_id = %id, "repeat visit ignored");
            return self.get_view(id).await;
        }

        let mut entity = match self.get_by_id(id).await {
            Ok(entity) => entity,
            Err(e) => {
                log_compensation("visit marker", id, repos.markers.remove(&marker).await);
                return Err(e);
            }
        };

        let total = match self.increment_value(id, 1).await {
            Ok(total) => total,
            Err(e) => {
                log_compensation("visit marker", id, repos.markers.remove(&marker).await);
                return Err(e);
            }
        };

        let today = ctx.calendar.day_of(now);
        if let Err(e) = repos.daily.increment(&key, today, 1).await {
            log_compensation("total", id, self.decrement_value(id, 1).await);
            log_compensation("visit marker", id, repos.markers.remove(&marker).await);
            return Err(e);
        }

        entity.total_count = total;
        entity.last_visit = Some(now);
        if let Err(e) = self.save(&entity).await {
            log_compensation("daily aggregate", id, repos.daily.increment(&key, today, -1).await);
            log_compensation("total", id, self.decrement_value(id, 1).await);
            log_compensation("visit marker", id, repos.markers.remove(&marker).await);
            return Err(e);
        }

        let data = self.data_for(&entity, now).await?;
        self.notify(&entity, "counter.increment", serde_json::to_value(&data)?);
        Ok(data)
    }

    pub async fn update_settings(
        &self,
        url: &str,
        token: &str,
        update: SettingsUpdate,
    ) -> Result<CounterEntity> {
        let mut entity = self.verify_ownership(url, token).await?;
        let settings = &mut entity.settings;
        update.apply(&self.ctx, &mut settings.title, &mut settings.webhook_url)?;
        self.save(&entity).await?;
        Ok(entity)
    }

    async fn data_for(&self, entity: &CounterEntity, now: DateTime<Utc>) -> Result<CounterData> {
        let key = self.entity_key(entity.id());
        let daily = &self.ctx.repos.daily;
        let today = self.ctx.calendar.day_of(now);
        let days_back = |n: i64| today - Duration::days(n);

        Ok(CounterData {
            id: entity.id().clone(),
            url: entity.url().to_string(),
            total: self.current_value(entity.id()).await?,
            today: non_negative(daily.get(&key, today).await?),
            yesterday: non_negative(daily.get(&key, days_back(1)).await?),
            week: non_negative(daily.sum_range(&key, days_back(6), today).await?),
            month: non_negative(daily.sum_range(&key, days_back(29), today).await?),
            last_visit: entity.last_visit,
        })
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl WidgetService for CounterService {
    type Entity = CounterEntity;
    type CreateParams = CounterCreateParams;
    type View = CounterData;

    fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    fn build_entity(&self, meta: WidgetMeta, params: CounterCreateParams) -> Result<CounterEntity> {
        Ok(CounterEntity {
            meta,
            settings: BasicSettings {
                title: normalize_title(params.title)?,
                webhook_url: normalize_webhook_url(&self.ctx, params.webhook_url)?,
            },
            total_count: 0,
            last_visit: None,
        })
    }

    async fn cleanup(&self, entity: &CounterEntity) -> Result<()> {
        let repos = &self.ctx.repos;
        let total = repos.counters.delete(&self.total_key(entity.id())).await;
        let daily = repos.daily.clear(&self.entity_key(entity.id())).await.map(|_| ());
        settle_cleanup(entity.id(), [("total", total), ("daily", daily)])
    }

    async fn transform(&self, entity: &CounterEntity) -> Result<CounterData> {
        self.data_for(entity, self.ctx.now()).await
    }
}

impl NumericWidgetService for CounterService {
    fn apply_total(entity: &mut CounterEntity, total: u64) {
        entity.total_count = total;
    }
}
