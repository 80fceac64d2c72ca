// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Widgets whose state is a single non-negative total.

use async_trait::async_trait;
use nostalgic_core::{NostalgicError, PublicId, Result, WidgetEntity, keys};
use tracing::info;

use crate::base::{WidgetService, log_compensation};

#[async_trait]
pub trait NumericWidgetService: WidgetService {
    /// Mirror the authoritative total onto the entity.
    fn apply_total(entity: &mut Self::Entity, total: u64);

    fn total_key(&self, id: &PublicId) -> String {
        keys::total(Self::Entity::KIND, id)
    }

    async fn current_value(&self, id: &PublicId) -> Result<u64> {
        let value = self.context().repos.counters.get(&self.total_key(id)).await?;
        Ok(u64::try_from(value).unwrap_or(0))
    }

    async fn increment_value(&self, id: &PublicId, delta: u32) -> Result<u64> {
        let value = self
            .context()
            .repos
            .counters
            .increment(&self.total_key(id), i64::from(delta))
            .await?;
        Ok(u64::try_from(value).unwrap_or(0))
    }

    /// Subtract, flooring at zero.
    async fn decrement_value(&self, id: &PublicId, delta: u32) -> Result<u64> {
        let value = self
            .context()
            .repos
            .counters
            .decrement(&self.total_key(id), i64::from(delta))
            .await?;
        Ok(u64::try_from(value).unwrap_or(0))
    }

    /// Owner override of the total.
    async fn set_value(&self, url: &str, token: &str, value: i64) -> Result<Self::Entity> {
        let total = u64::try_from(value)
            .map_err(|_| NostalgicError::validation("value must be a non-negative integer"))?;
        let mut entity = self.verify_ownership(url, token).await?;
        let id = entity.id().clone();
        let counters = &self.context().repos.counters;
        let key = self.total_key(&id);

        let previous = counters.get(&key).await?;
        counters.set(&key, value).await?;
        Self::apply_total(&mut entity, total);
        if let Err(e) = self.save(&entity).await {
            log_compensation("restore total", &id, counters.set(&key, previous).await);
            return Err(e);
        }

        info!(kind = %self.kind(), widget_id = %id, value, "total overridden by owner");
        Ok(entity)
    }
}
