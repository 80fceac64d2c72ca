// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain services for the Nostalgic widgets.
//!
//! [`WidgetService`] carries the lifecycle every widget shares (create,
//! fetch, ownership check, delete with cleanup). The four concrete services
//! add their own mutations on top. Multi-row mutations are applied in a fixed
//! order and undone in reverse when a later step fails; nothing here opens a
//! storage transaction.

pub mod base;
pub mod bbs;
pub mod calendar;
pub mod context;
pub mod counter;
pub mod filter;
pub mod ids;
pub mod like;
pub mod numeric;
pub mod policy;
pub mod ranking;
pub mod sweep;
pub mod webhook;

use std::sync::Arc;

pub use base::{SettingsUpdate, WidgetService};
pub use bbs::BbsService;
pub use calendar::Calendar;
pub use context::ServiceContext;
pub use counter::CounterService;
pub use filter::PatternFilter;
pub use like::LikeService;
pub use numeric::NumericWidgetService;
pub use policy::{BbsPolicy, RankingPolicy, ServicePolicy};
pub use ranking::RankingService;
pub use sweep::{SweepReport, Sweeper};
pub use webhook::ReqwestNotifier;

/// One instance of every service, sharing a context.
#[derive(Clone)]
pub struct Services {
    pub counter: Arc<CounterService>,
    pub like: Arc<LikeService>,
    pub ranking: Arc<RankingService>,
    pub bbs: Arc<BbsService>,
    pub sweeper: Arc<Sweeper>,
}

impl Services {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        let counter = Arc::new(CounterService::new(ctx.clone()));
        let like = Arc::new(LikeService::new(ctx.clone()));
        let ranking = Arc::new(RankingService::new(ctx.clone()));
        let bbs = Arc::new(BbsService::new(ctx.clone()));
        let sweeper = Arc::new(Sweeper::new(
            ctx,
            counter.clone(),
            like.clone(),
            ranking.clone(),
            bbs.clone(),
        ));
        Self {
            counter,
            like,
            ranking,
            bbs,
            sweeper,
        }
    }
}
