// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-addressed storage shapes over a single relational backing store.
//!
//! Every operation is a single atomic storage call. Multi-row consistency is
//! the caller's job (apply in order, compensate in reverse on failure).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::types::ServiceKind;

/// One JSON document per key.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn save(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns whether a row was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Integer counters updated by atomic upsert-with-delta.
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Current value, `0` when the key does not exist.
    async fn get(&self, key: &str) -> Result<i64>;

    async fn set(&self, key: &str, value: i64) -> Result<()>;

    /// Adds `delta` and returns the new value.
    async fn increment(&self, key: &str, delta: i64) -> Result<i64>;

    /// Subtracts `delta`, never going below zero, and returns the new value.
    async fn decrement(&self, key: &str, delta: i64) -> Result<i64>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Direction used when indexing into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub item_id: String,
    pub value: String,
}

/// Append-only list with range reads and trimming.
///
/// Indices are zero-based and inclusive; negative indices count from the end
/// (`-1` is the last element in the requested order).
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Appends and returns the new length. `item_id` must be unique within the key.
    async fn push(&self, key: &str, item_id: &str, value: &str) -> Result<u64>;

    async fn range(&self, key: &str, start: i64, stop: i64, order: ListOrder)
    -> Result<Vec<ListItem>>;

    async fn length(&self, key: &str) -> Result<u64>;

    /// Keeps only the newest-first indices `start..=stop`; returns how many items were removed.
    async fn trim(&self, key: &str, start: i64, stop: i64) -> Result<u64>;

    async fn get_item(&self, key: &str, item_id: &str) -> Result<Option<String>>;

    /// Rewrites one item in place; returns whether it existed.
    async fn update_item(&self, key: &str, item_id: &str, value: &str) -> Result<bool>;

    async fn remove_item(&self, key: &str, item_id: &str) -> Result<bool>;

    async fn clear(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMember {
    pub member: String,
    pub score: i64,
}

/// Members ordered by score, ties broken by member name.
#[async_trait]
pub trait SortedSetRepository: Send + Sync {
    /// Inserts or overwrites the member's score.
    async fn add(&self, key: &str, member: &str, score: i64) -> Result<()>;

    /// Inserts the member, or raises its score when `score` is strictly
    /// greater than the stored one. Returns whether a row changed.
    async fn add_if_greater(&self, key: &str, member: &str, score: i64) -> Result<bool>;

    async fn remove(&self, key: &str, member: &str) -> Result<bool>;

    async fn score(&self, key: &str, member: &str) -> Result<Option<i64>>;

    async fn range_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        ascending: bool,
    ) -> Result<Vec<ScoredMember>>;

    async fn count(&self, key: &str) -> Result<u64>;

    /// Removes ascending ranks `start..=stop` and returns the removed members.
    async fn remove_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    async fn clear(&self, key: &str) -> Result<()>;
}

/// String-valued field map under one key.
#[async_trait]
pub trait HashRepository: Send + Sync {
    async fn set(&self, key: &str, field: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str, field: &str) -> Result<Option<String>>;

    async fn get_all(&self, key: &str) -> Result<Vec<(String, String)>>;

    async fn remove(&self, key: &str, field: &str) -> Result<bool>;

    async fn clear(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub url: String,
    pub id: String,
}

/// Canonical owner URL to public id, unique per widget kind.
#[async_trait]
pub trait UrlMappingRepository: Send + Sync {
    /// Inserts the mapping only if the URL is not registered yet. Returns whether it was inserted.
    async fn reserve(&self, kind: ServiceKind, url: &str, id: &str) -> Result<bool>;

    async fn get_id(&self, kind: ServiceKind, url: &str) -> Result<Option<String>>;

    async fn remove(&self, kind: ServiceKind, url: &str) -> Result<bool>;

    async fn list(&self, kind: ServiceKind) -> Result<Vec<UrlMapping>>;
}

/// Address of an ephemeral dedup or cooldown marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    /// Entity key of the widget the marker belongs to.
    pub widget: String,
    pub actor: String,
    pub marker_type: String,
    /// Coarse time key (a calendar date, or a fixed label for cooldowns).
    pub partition: String,
}

/// Insert-if-absent markers with read-time expiry.
#[async_trait]
pub trait MarkerRepository: Send + Sync {
    /// Atomically creates the marker unless a live one exists. Returns `true` when newly created.
    async fn try_acquire(
        &self,
        marker: &MarkerKey,
        value: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Value of the marker if it exists and has not expired.
    async fn get(&self, marker: &MarkerKey, now: DateTime<Utc>) -> Result<Option<String>>;

    /// Rewrites the value and keeps the original expiry. Returns whether the marker existed.
    async fn set_value(&self, marker: &MarkerKey, value: &str) -> Result<bool>;

    /// Rewrites the value only if it currently equals `expected` and is still live.
    /// Returns whether the swap happened.
    async fn compare_and_set(
        &self,
        marker: &MarkerKey,
        expected: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    async fn remove(&self, marker: &MarkerKey) -> Result<bool>;

    /// Removes every marker of one widget.
    async fn purge_widget(&self, widget: &str) -> Result<u64>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Per-widget per-day counts.
#[async_trait]
pub trait DailyAggregateRepository: Send + Sync {
    /// Adds `delta` (may be negative, floored at zero) and returns the new count.
    async fn increment(&self, widget: &str, day: NaiveDate, delta: i64) -> Result<i64>;

    async fn get(&self, widget: &str, day: NaiveDate) -> Result<i64>;

    /// Sum over `from..=to`.
    async fn sum_range(&self, widget: &str, from: NaiveDate, to: NaiveDate) -> Result<i64>;

    async fn clear(&self, widget: &str) -> Result<u64>;
}

/// The full set of repositories a service needs.
#[derive(Clone)]
pub struct Repositories {
    pub entities: Arc<dyn EntityRepository>,
    pub counters: Arc<dyn CounterRepository>,
    pub lists: Arc<dyn ListRepository>,
    pub sorted_sets: Arc<dyn SortedSetRepository>,
    pub hashes: Arc<dyn HashRepository>,
    pub url_mappings: Arc<dyn UrlMappingRepository>,
    pub markers: Arc<dyn MarkerRepository>,
    pub daily: Arc<dyn DailyAggregateRepository>,
}
