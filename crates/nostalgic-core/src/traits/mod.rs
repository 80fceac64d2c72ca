// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port traits implemented by storage and infrastructure crates.
//!
//! Repository traits use `#[async_trait]` so services can hold them as
//! `Arc<dyn Trait>` and swap implementations in tests.

pub mod clock;
pub mod filter;
pub mod notifier;
pub mod repository;

pub use clock::{Clock, SystemClock};
pub use filter::{AllowAll, ContentFilter};
pub use notifier::{NoopNotifier, WebhookNotifier, WebhookPayload};
pub use repository::{
    CounterRepository, DailyAggregateRepository, EntityRepository, HashRepository, ListItem,
    ListOrder, ListRepository, MarkerKey, MarkerRepository, Repositories, ScoredMember,
    SortedSetRepository, UrlMapping, UrlMappingRepository,
};
