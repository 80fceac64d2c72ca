// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention sweep: purge widgets idle past the retention window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use nostalgic_core::{PublicId, Result, WidgetEntity};
use serde::Serialize;
use tracing::{info, warn};

use crate::base::WidgetService;
use crate::bbs::BbsService;
use crate::context::ServiceContext;
use crate::counter::CounterService;
use crate::like::LikeService;
use crate::ranking::RankingService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// URL mappings looked at.
    pub examined: u64,
    /// Widgets removed, including mappings whose entity was already gone.
    pub purged: u64,
    pub markers_purged: u64,
}

pub struct Sweeper {
    ctx: Arc<ServiceContext>,
    counter: Arc<CounterService>,
    like: Arc<LikeService>,
    ranking: Arc<RankingService>,
    bbs: Arc<BbsService>,
}

impl Sweeper {
    pub fn new(
        ctx: Arc<ServiceContext>,
        counter: Arc<CounterService>,
        like: Arc<LikeService>,
        ranking: Arc<RankingService>,
        bbs: Arc<BbsService>,
    ) -> Self {
        Self {
            ctx,
            counter,
            like,
            ranking,
            bbs,
        }
    }

    /// Walk every widget of every kind once. Per-widget failures are logged
    /// and skipped; only listing failures abort the run.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let cutoff = now - Duration::days(i64::from(self.ctx.policy.retention_days));
        let mut report = SweepReport::default();

        sweep_kind(self.counter.as_ref(), cutoff, &mut report).await?;
        sweep_kind(self.like.as_ref(), cutoff, &mut report).await?;
        sweep_kind(self.ranking.as_ref(), cutoff, &mut report).await?;
        sweep_kind(self.bbs.as_ref(), cutoff, &mut report).await?;

        report.markers_purged = self.ctx.repos.markers.purge_expired(now).await?;
        info!(
            examined = report.examined,
            purged = report.purged,
            markers_purged = report.markers_purged,
            "retention sweep finished"
        );
        Ok(report)
    }
}

async fn sweep_kind<S: WidgetService>(
    service: &S,
    cutoff: DateTime<Utc>,
    report: &mut SweepReport,
) -> Result<()> {
    let kind = service.kind();
    let url_mappings = &service.context().repos.url_mappings;
    for mapping in url_mappings.list(kind).await? {
        report.examined += 1;
        let entity = match PublicId::parse(&mapping.id) {
            Ok(id) => service.load(&id).await,
            Err(_) => Ok(None),
        };
        match entity {
            Ok(Some(entity)) if entity.last_activity() < cutoff => {
                match service.purge(&entity).await {
                    Ok(()) => report.purged += 1,
                    Err(e) => warn!(kind = %kind, widget_id = %mapping.id, error = %e, "sweep purge failed"),
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => match url_mappings.remove(kind, &mapping.url).await {
                Ok(_) => {
                    report.purged += 1;
                    info!(kind = %kind, widget_id = %mapping.id, "removed orphaned url mapping");
                }
                Err(e) => warn!(kind = %kind, error = %e, "orphaned mapping removal failed"),
            },
            Err(e) => warn!(kind = %kind, widget_id = %mapping.id, error = %e, "sweep load failed"),
        }
    }
    Ok(())
}
