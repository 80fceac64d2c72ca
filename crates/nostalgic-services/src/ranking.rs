// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leaderboard backed by a sorted set plus a parallel display-score map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nostalgic_core::traits::MarkerKey;
use nostalgic_core::{
    NostalgicError, PublicId, RankingEntity, RankingEntry, RankingSettings, Result, SortOrder,
    VisitorHash, WidgetEntity, WidgetMeta, keys,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::base::{
    SettingsUpdate, WidgetService, log_compensation, normalize_title, normalize_webhook_url,
    settle_cleanup,
};
use crate::context::ServiceContext;

const SUBMIT_MARKER: &str = "submit";
const COOLDOWN_PARTITION: &str = "cooldown";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCreateParams {
    pub title: Option<String>,
    pub webhook_url: Option<String>,
    pub max_entries: Option<u32>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub name: String,
    pub score: i64,
    pub display_score: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSettingsUpdate {
    #[serde(flatten)]
    pub common: SettingsUpdate,
    pub max_entries: Option<u32>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingData {
    pub id: PublicId,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sort_order: SortOrder,
    pub max_entries: u32,
    pub total_entries: u64,
    pub entries: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<RankingEntry>,
    pub data: RankingData,
}

/// Score and display score of one name before a write, for rollback.
struct PriorEntry {
    score: Option<i64>,
    display: Option<String>,
}

pub struct RankingService {
    ctx: Arc<ServiceContext>,
}

impl RankingService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Anonymous submission: accepted only for a new name or a strictly higher score.
    pub async fn submit(
        &self,
        id: &PublicId,
        visitor: &VisitorHash,
        submission: ScoreSubmission,
    ) -> Result<SubmitOutcome> {
        let entity = self.get_by_id(id).await?;
        self.write_score(entity, visitor, submission, true).await
    }

    /// Owner submission: always overwrites.
    pub async fn owner_submit(
        &self,
        url: &str,
        token: &str,
        visitor: &VisitorHash,
        submission: ScoreSubmission,
    ) -> Result<SubmitOutcome> {
        let entity = self.verify_ownership(url, token).await?;
        self.write_score(entity, visitor, submission, false).await
    }

    async fn write_score(
        &self,
        mut entity: RankingEntity,
        visitor: &VisitorHash,
        submission: ScoreSubmission,
        require_improvement: bool,
    ) -> Result<SubmitOutcome> {
        let ctx = &self.ctx;
        let repos = &ctx.repos;
        let (name, display) = self.validate_submission(&submission)?;
        let score = submission.score;
        let id = entity.id().clone();
        let now = ctx.now();

        let prior = self.prior_entry(&id, &name).await?;
        if require_improvement && prior.score.is_some_and(|existing| score <= existing) {
            debug!(widget_id = %id, "submission does not improve the stored score");
            return self.rejected(&entity, &name).await;
        }

        let cooldown = MarkerKey {
            widget: self.entity_key(&id),
            actor: visitor.as_str().to_string(),
            marker_type: SUBMIT_MARKER.to_string(),
            partition: COOLDOWN_PARTITION.to_string(),
        };
        let expires = now + ctx.policy.ranking.submit_cooldown;
        if !repos.markers.try_acquire(&cooldown, "1", expires, now).await? {
            return Err(NostalgicError::validation("please wait before submitting again"));
        }

        let stored = self
            .store_entry(&id, &name, score, display.as_deref(), &prior, require_improvement)
            .await;
        match stored {
            Ok(true) => {}
            Ok(false) => {
                debug!(widget_id = %id, "a concurrent submission stored a higher score");
                log_compensation("cooldown", &id, repos.markers.remove(&cooldown).await);
                return self.rejected(&entity, &name).await;
            }
            Err(e) => {
                log_compensation("cooldown", &id, repos.markers.remove(&cooldown).await);
                return Err(e);
            }
        }

        let saved = async {
            entity.total_entries = repos.sorted_sets.count(&keys::ranking_scores(&id)).await?;
            entity.last_submit = Some(now);
            self.save(&entity).await
        }
        .await;
        if let Err(e) = saved {
            self.restore_entry(&id, &name, prior).await;
            log_compensation("cooldown", &id, repos.markers.remove(&cooldown).await);
            return Err(e);
        }

        self.enforce_cap(&entity).await;
        self.refresh_total(&mut entity).await;

        let entry = self.find_entry(&entity, &name).await?;
        self.notify(
            &entity,
            "ranking.submit",
            serde_json::json!({ "name": name, "score": score, "displayScore": display }),
        );
        Ok(SubmitOutcome {
            accepted: true,
            entry,
            data: self.data_for(&entity, None).await?,
        })
    }

    async fn rejected(&self, entity: &RankingEntity, name: &str) -> Result<SubmitOutcome> {
        Ok(SubmitOutcome {
            accepted: false,
            entry: self.find_entry(entity, name).await?,
            data: self.data_for(entity, None).await?,
        })
    }

    /// Re-count after a trim; the submission already succeeded, so failures are only logged.
    async fn refresh_total(&self, entity: &mut RankingEntity) {
        let id = entity.id().clone();
        let count = match self.ctx.repos.sorted_sets.count(&keys::ranking_scores(&id)).await {
            Ok(count) => count,
            Err(e) => {
                warn!(widget_id = %id, error = %e, "ranking re-count failed");
                return;
            }
        };
        if count != entity.total_entries {
            entity.total_entries = count;
            if let Err(e) = self.save(entity).await {
                warn!(widget_id = %id, error = %e, "saving trimmed ranking total failed");
            }
        }
    }

    /// Owner overwrite of an existing entry.
    pub async fn update_score(
        &self,
        url: &str,
        token: &str,
        submission: ScoreSubmission,
    ) -> Result<RankingData> {
        let entity = self.verify_ownership(url, token).await?;
        let (name, display) = self.validate_submission(&submission)?;
        let id = entity.id().clone();

        let prior = self.prior_entry(&id, &name).await?;
        if prior.score.is_none() {
            return Err(NostalgicError::not_found("entry not found"));
        }
        self.store_entry(&id, &name, submission.score, display.as_deref(), &prior, false)
            .await?;
        info!(widget_id = %id, "ranking entry updated by owner");
        self.data_for(&entity, None).await
    }

    pub async fn remove_entry(&self, url: &str, token: &str, name: &str) -> Result<RankingData> {
        let mut entity = self.verify_ownership(url, token).await?;
        let repos = &self.ctx.repos;
        let id = entity.id().clone();
        let name = name.trim();

        if !repos.sorted_sets.remove(&keys::ranking_scores(&id), name).await? {
            return Err(NostalgicError::not_found("entry not found"));
        }
        repos.hashes.remove(&keys::ranking_display(&id), name).await?;
        entity.total_entries = repos.sorted_sets.count(&keys::ranking_scores(&id)).await?;
        self.save(&entity).await?;
        self.data_for(&entity, None).await
    }

    pub async fn clear(&self, url: &str, token: &str) -> Result<RankingData> {
        let mut entity = self.verify_ownership(url, token).await?;
        self.cleanup(&entity).await?;
        entity.total_entries = 0;
        self.save(&entity).await?;
        info!(widget_id = %entity.id(), "ranking cleared");
        self.data_for(&entity, None).await
    }

    /// Entries in display order; `limit` is clamped to `1..=maxEntries`.
    pub async fn get(&self, id: &PublicId, limit: Option<u32>) -> Result<RankingData> {
        let entity = self.get_by_id(id).await?;
        self.data_for(&entity, limit).await
    }

    pub async fn update_settings(
        &self,
        url: &str,
        token: &str,
        update: RankingSettingsUpdate,
    ) -> Result<RankingEntity> {
        let mut entity = self.verify_ownership(url, token).await?;
        let settings = &mut entity.settings;
        update
            .common
            .apply(&self.ctx, &mut settings.title, &mut settings.webhook_url)?;
        if let Some(order) = update.sort_order {
            settings.sort_order = order;
        }
        if let Some(max) = update.max_entries {
            settings.max_entries = self.validate_max_entries(max)?;
        }

        self.enforce_cap(&entity).await;
        entity.total_entries = self
            .ctx
            .repos
            .sorted_sets
            .count(&keys::ranking_scores(entity.id()))
            .await?;
        self.save(&entity).await?;
        Ok(entity)
    }

    fn validate_submission(&self, submission: &ScoreSubmission) -> Result<(String, Option<String>)> {
        let policy = &self.ctx.policy.ranking;
        let name = submission.name.trim().to_string();
        if name.is_empty() {
            return Err(NostalgicError::validation("name is required"));
        }
        if name.chars().count() > policy.name_max_len {
            return Err(NostalgicError::validation(format!(
                "name must be at most {} characters",
                policy.name_max_len
            )));
        }
        let display = submission
            .display_score
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if display
            .as_ref()
            .is_some_and(|d| d.chars().count() > policy.display_score_max_len)
        {
            return Err(NostalgicError::validation(format!(
                "displayScore must be at most {} characters",
                policy.display_score_max_len
            )));
        }
        Ok((name, display))
    }

    fn validate_max_entries(&self, max: u32) -> Result<u32> {
        let cap = self.ctx.policy.ranking.max_entries_cap;
        if !(1..=cap).contains(&max) {
            return Err(NostalgicError::validation(format!(
                "maxEntries must be between 1 and {cap}"
            )));
        }
        Ok(max)
    }

    async fn prior_entry(&self, id: &PublicId, name: &str) -> Result<PriorEntry> {
        let repos = &self.ctx.repos;
        Ok(PriorEntry {
            score: repos.sorted_sets.score(&keys::ranking_scores(id), name).await?,
            display: repos.hashes.get(&keys::ranking_display(id), name).await?,
        })
    }

    /// Write score then display score; a failed display write restores the old score.
    ///
    /// With `require_improvement` the score is only written when it beats the
    /// stored one at write time; `Ok(false)` means nothing was written.
    async fn store_entry(
        &self,
        id: &PublicId,
        name: &str,
        score: i64,
        display: Option<&str>,
        prior: &PriorEntry,
        require_improvement: bool,
    ) -> Result<bool> {
        let repos = &self.ctx.repos;
        let scores_key = keys::ranking_scores(id);
        let display_key = keys::ranking_display(id);

        if require_improvement {
            if !repos.sorted_sets.add_if_greater(&scores_key, name, score).await? {
                return Ok(false);
            }
        } else {
            repos.sorted_sets.add(&scores_key, name, score).await?;
        }
        let display_written = match display {
            Some(d) => repos.hashes.set(&display_key, name, d).await,
            None => repos.hashes.remove(&display_key, name).await.map(|_| ()),
        };
        if let Err(e) = display_written {
            let undo = match prior.score {
                Some(previous) => repos.sorted_sets.add(&scores_key, name, previous).await,
                None => repos.sorted_sets.remove(&scores_key, name).await.map(|_| ()),
            };
            log_compensation("score", id, undo);
            return Err(e);
        }
        Ok(true)
    }

    async fn restore_entry(&self, id: &PublicId, name: &str, prior: PriorEntry) {
        let repos = &self.ctx.repos;
        let display_key = keys::ranking_display(id);
        let scores_key = keys::ranking_scores(id);
        let display_undo = match prior.display {
            Some(d) => repos.hashes.set(&display_key, name, &d).await,
            None => repos.hashes.remove(&display_key, name).await.map(|_| ()),
        };
        log_compensation("display score", id, display_undo);
        let score_undo = match prior.score {
            Some(previous) => repos.sorted_sets.add(&scores_key, name, previous).await,
            None => repos.sorted_sets.remove(&scores_key, name).await.map(|_| ()),
        };
        log_compensation("score", id, score_undo);
    }

    /// Drop the numerically smallest scores until the cap holds.
    async fn enforce_cap(&self, entity: &RankingEntity) {
        let id = entity.id();
        if let Err(e) = self.trim_excess(entity).await {
            warn!(widget_id = %id, error = %e, "ranking trim failed; next submission retries");
        }
    }

    async fn trim_excess(&self, entity: &RankingEntity) -> Result<()> {
        let repos = &self.ctx.repos;
        let scores_key = keys::ranking_scores(entity.id());
        let display_key = keys::ranking_display(entity.id());
        let count = repos.sorted_sets.count(&scores_key).await?;
        let cap = u64::from(entity.settings.max_entries);
        if count <= cap {
            return Ok(());
        }
        let excess = i64::try_from(count - cap)
            .map_err(|_| NostalgicError::Internal("ranking size overflow".into()))?;
        let removed = repos.sorted_sets.remove_range(&scores_key, 0, excess - 1).await?;
        for member in &removed {
            repos.hashes.remove(&display_key, member).await?;
        }
        debug!(widget_id = %entity.id(), removed = removed.len(), "ranking trimmed to cap");
        Ok(())
    }

    async fn ranked_entries(&self, entity: &RankingEntity, limit: u32) -> Result<Vec<RankingEntry>> {
        let repos = &self.ctx.repos;
        let ascending = entity.settings.sort_order == SortOrder::Asc;
        let members = repos
            .sorted_sets
            .range_with_scores(
                &keys::ranking_scores(entity.id()),
                0,
                i64::from(limit) - 1,
                ascending,
            )
            .await?;
        let displays: HashMap<String, String> = repos
            .hashes
            .get_all(&keys::ranking_display(entity.id()))
            .await?
            .into_iter()
            .collect();
        Ok(competition_rank(members.into_iter().map(|m| (m.member, m.score)))
            .into_iter()
            .map(|(rank, name, score)| RankingEntry {
                rank,
                display_score: displays.get(&name).cloned(),
                name,
                score,
            })
            .collect())
    }

    async fn find_entry(&self, entity: &RankingEntity, name: &str) -> Result<Option<RankingEntry>> {
        let entries = self
            .ranked_entries(entity, entity.settings.max_entries)
            .await?;
        Ok(entries.into_iter().find(|e| e.name == name))
    }

    async fn data_for(&self, entity: &RankingEntity, limit: Option<u32>) -> Result<RankingData> {
        let max = entity.settings.max_entries.max(1);
        let limit = limit.unwrap_or(max).clamp(1, max);
        Ok(RankingData {
            id: entity.id().clone(),
            url: entity.url().to_string(),
            title: entity.settings.title.clone(),
            sort_order: entity.settings.sort_order,
            max_entries: entity.settings.max_entries,
            total_entries: entity.total_entries,
            entries: self.ranked_entries(entity, limit).await?,
        })
    }
}

/// Standard competition ranking ("1224"): ties share a rank and the next rank skips.
fn competition_rank(ordered: impl Iterator<Item = (String, i64)>) -> Vec<(u32, String, i64)> {
    let mut ranked = Vec::new();
    let mut rank = 0u32;
    let mut previous: Option<i64> = None;
    for (position, (name, score)) in (1u32..).zip(ordered) {
        if previous != Some(score) {
            rank = position;
            previous = Some(score);
        }
        ranked.push((rank, name, score));
    }
    ranked
}

#[async_trait]
impl WidgetService for RankingService {
    type Entity = RankingEntity;
    type CreateParams = RankingCreateParams;
    type View = RankingData;

    fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    fn build_entity(&self, meta: WidgetMeta, params: RankingCreateParams) -> Result<RankingEntity> {
        let max_entries = self.validate_max_entries(
            params
                .max_entries
                .unwrap_or(self.ctx.policy.ranking.default_max_entries),
        )?;
        Ok(RankingEntity {
            meta,
            settings: RankingSettings {
                title: normalize_title(params.title)?,
                webhook_url: normalize_webhook_url(&self.ctx, params.webhook_url)?,
                max_entries,
                sort_order: params.sort_order.unwrap_or_default(),
            },
            total_entries: 0,
            last_submit: None,
        })
    }

    async fn cleanup(&self, entity: &RankingEntity) -> Result<()> {
        let repos = &self.ctx.repos;
        let scores = repos.sorted_sets.clear(&keys::ranking_scores(entity.id())).await;
        let display = repos.hashes.clear(&keys::ranking_display(entity.id())).await;
        settle_cleanup(entity.id(), [("scores", scores), ("display scores", display)])
    }

    async fn transform(&self, entity: &RankingEntity) -> Result<RankingData> {
        self.data_for(entity, None).await
    }
}
