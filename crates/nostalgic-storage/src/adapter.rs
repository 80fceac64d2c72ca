// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the repository ports.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use nostalgic_core::traits::{
    CounterRepository, DailyAggregateRepository, EntityRepository, HashRepository, ListItem,
    ListOrder, ListRepository, MarkerKey, MarkerRepository, Repositories, ScoredMember,
    SortedSetRepository, UrlMapping, UrlMappingRepository,
};
use nostalgic_core::{NostalgicError, ServiceKind};

use crate::database::Database;
use crate::queries;

/// Every repository port backed by one [`Database`].
///
/// The struct implements all eight traits; [`SqliteRepositories::repositories`]
/// hands out the same instance behind each trait object.
pub struct SqliteRepositories {
    db: Arc<Database>,
}

impl SqliteRepositories {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            entities: self.clone(),
            counters: self.clone(),
            lists: self.clone(),
            sorted_sets: self.clone(),
            hashes: self.clone(),
            url_mappings: self.clone(),
            markers: self.clone(),
            daily: self,
        }
    }
}

#[async_trait]
impl EntityRepository for SqliteRepositories {
    async fn save(&self, key: &str, value: &str) -> Result<(), NostalgicError> {
        queries::entities::save_entity(&self.db, key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, NostalgicError> {
        queries::entities::get_entity(&self.db, key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, NostalgicError> {
        queries::entities::entity_exists(&self.db, key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, NostalgicError> {
        queries::entities::delete_entity(&self.db, key).await
    }
}

#[async_trait]
impl CounterRepository for SqliteRepositories {
    async fn get(&self, key: &str) -> Result<i64, NostalgicError> {
        queries::counters::get_counter(&self.db, key).await
    }

    async fn set(&self, key: &str, value: i64) -> Result<(), NostalgicError> {
        queries::counters::set_counter(&self.db, key, value).await
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64, NostalgicError> {
        queries::counters::increment_counter(&self.db, key, delta).await
    }

    async fn decrement(&self, key: &str, delta: i64) -> Result<i64, NostalgicError> {
        queries::counters::decrement_counter(&self.db, key, delta).await
    }

    async fn delete(&self, key: &str) -> Result<(), NostalgicError> {
        queries::counters::delete_counter(&self.db, key).await
    }
}

#[async_trait]
impl ListRepository for SqliteRepositories {
    async fn push(&self, key: &str, item_id: &str, value: &str) -> Result<u64, NostalgicError> {
        queries::lists::push_item(&self.db, key, item_id, value).await
    }

    async fn range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: ListOrder,
    ) -> Result<Vec<ListItem>, NostalgicError> {
        queries::lists::range_items(&self.db, key, start, stop, order).await
    }

    async fn length(&self, key: &str) -> Result<u64, NostalgicError> {
        queries::lists::list_length(&self.db, key).await
    }

    async fn trim(&self, key: &str, start: i64, stop: i64) -> Result<u64, NostalgicError> {
        queries::lists::trim_list(&self.db, key, start, stop).await
    }

    async fn get_item(&self, key: &str, item_id: &str) -> Result<Option<String>, NostalgicError> {
        queries::lists::get_item(&self.db, key, item_id).await
    }

    async fn update_item(
        &self,
        key: &str,
        item_id: &str,
        value: &str,
    ) -> Result<bool, NostalgicError> {
        queries::lists::update_item(&self.db, key, item_id, value).await
    }

    async fn remove_item(&self, key: &str, item_id: &str) -> Result<bool, NostalgicError> {
        queries::lists::remove_item(&self.db, key, item_id).await
    }

    async fn clear(&self, key: &str) -> Result<(), NostalgicError> {
        queries::lists::clear_list(&self.db, key).await
    }
}

#[async_trait]
impl SortedSetRepository for SqliteRepositories {
    async fn add(&self, key: &str, member: &str, score: i64) -> Result<(), NostalgicError> {
        queries::sorted_sets::add_member(&self.db, key, member, score).await
    }

    async fn add_if_greater(
        &self,
        key: &str,
        member: &str,
        score: i64,
    ) -> Result<bool, NostalgicError> {
        queries::sorted_sets::add_member_if_greater(&self.db, key, member, score).await
    }

    async fn remove(&self, key: &str, member: &str) -> Result<bool, NostalgicError> {
        queries::sorted_sets::remove_member(&self.db, key, member).await
    }

    async fn score(&self, key: &str, member: &str) -> Result<Option<i64>, NostalgicError> {
        queries::sorted_sets::member_score(&self.db, key, member).await
    }

    async fn range_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        ascending: bool,
    ) -> Result<Vec<ScoredMember>, NostalgicError> {
        queries::sorted_sets::range_with_scores(&self.db, key, start, stop, ascending).await
    }

    async fn count(&self, key: &str) -> Result<u64, NostalgicError> {
        queries::sorted_sets::count_members(&self.db, key).await
    }

    async fn remove_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, NostalgicError> {
        queries::sorted_sets::remove_range(&self.db, key, start, stop).await
    }

    async fn clear(&self, key: &str) -> Result<(), NostalgicError> {
        queries::sorted_sets::clear_set(&self.db, key).await
    }
}

#[async_trait]
impl HashRepository for SqliteRepositories {
    async fn set(&self, key: &str, field: &str, value: &str) -> Result<(), NostalgicError> {
        queries::hashes::set_field(&self.db, key, field, value).await
    }

    async fn get(&self, key: &str, field: &str) -> Result<Option<String>, NostalgicError> {
        queries::hashes::get_field(&self.db, key, field).await
    }

    async fn get_all(&self, key: &str) -> Result<Vec<(String, String)>, NostalgicError> {
        queries::hashes::get_all_fields(&self.db, key).await
    }

    async fn remove(&self, key: &str, field: &str) -> Result<bool, NostalgicError> {
        queries::hashes::remove_field(&self.db, key, field).await
    }

    async fn clear(&self, key: &str) -> Result<(), NostalgicError> {
        queries::hashes::clear_hash(&self.db, key).await
    }
}

#[async_trait]
impl UrlMappingRepository for SqliteRepositories {
    async fn reserve(&self, kind: ServiceKind, url: &str, id: &str) -> Result<bool, NostalgicError> {
        queries::url_mappings::reserve_url(&self.db, kind, url, id).await
    }

    async fn get_id(&self, kind: ServiceKind, url: &str) -> Result<Option<String>, NostalgicError> {
        queries::url_mappings::get_mapped_id(&self.db, kind, url).await
    }

    async fn remove(&self, kind: ServiceKind, url: &str) -> Result<bool, NostalgicError> {
        queries::url_mappings::remove_url(&self.db, kind, url).await
    }

    async fn list(&self, kind: ServiceKind) -> Result<Vec<UrlMapping>, NostalgicError> {
        queries::url_mappings::list_urls(&self.db, kind).await
    }
}

#[async_trait]
impl MarkerRepository for SqliteRepositories {
    async fn try_acquire(
        &self,
        marker: &MarkerKey,
        value: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, NostalgicError> {
        queries::markers::try_acquire(&self.db, marker, value, expires_at, now).await
    }

    async fn get(
        &self,
        marker: &MarkerKey,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, NostalgicError> {
        queries::markers::get_marker(&self.db, marker, now).await
    }

    async fn set_value(&self, marker: &MarkerKey, value: &str) -> Result<bool, NostalgicError> {
        queries::markers::set_marker_value(&self.db, marker, value).await
    }

    async fn compare_and_set(
        &self,
        marker: &MarkerKey,
        expected: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, NostalgicError> {
        queries::markers::compare_and_set_marker(&self.db, marker, expected, value, now).await
    }

    async fn remove(&self, marker: &MarkerKey) -> Result<bool, NostalgicError> {
        queries::markers::remove_marker(&self.db, marker).await
    }

    async fn purge_widget(&self, widget: &str) -> Result<u64, NostalgicError> {
        queries::markers::purge_widget_markers(&self.db, widget).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, NostalgicError> {
        queries::markers::purge_expired_markers(&self.db, now).await
    }
}

#[async_trait]
impl DailyAggregateRepository for SqliteRepositories {
    async fn increment(&self, widget: &str, day: NaiveDate, delta: i64) -> Result<i64, NostalgicError> {
        queries::daily::increment_day(&self.db, widget, day, delta).await
    }

    async fn get(&self, widget: &str, day: NaiveDate) -> Result<i64, NostalgicError> {
        queries::daily::get_day(&self.db, widget, day).await
    }

    async fn sum_range(
        &self,
        widget: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, NostalgicError> {
        queries::daily::sum_days(&self.db, widget, from, to).await
    }

    async fn clear(&self, widget: &str) -> Result<u64, NostalgicError> {
        queries::daily::clear_days(&self.db, widget).await
    }
}
