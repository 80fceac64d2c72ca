// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault injection around the repository ports.
//!
//! Every wrapped call is named `<port>.<method>` (for example
//! `daily.increment` or `entities.save`). Arming a name makes matching calls
//! fail with a storage error until it is healed, optionally after letting a
//! number of calls through first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use nostalgic_core::traits::{
    CounterRepository, DailyAggregateRepository, EntityRepository, HashRepository, ListItem,
    ListOrder, ListRepository, MarkerKey, MarkerRepository, ScoredMember, SortedSetRepository,
    UrlMapping, UrlMappingRepository,
};
use nostalgic_core::{NostalgicError, Repositories, Result, ServiceKind};

/// Shared switchboard of armed failures.
#[derive(Default)]
pub struct Faults {
    /// Operation name to the number of calls still allowed through.
    armed: Mutex<HashMap<String, u32>>,
}

impl Faults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call to `op` from now on.
    pub fn fail(&self, op: &str) {
        self.fail_after(op, 0);
    }

    /// Let `successes` calls to `op` through, then fail the rest.
    pub fn fail_after(&self, op: &str, successes: u32) {
        self.armed.lock().unwrap().insert(op.to_string(), successes);
    }

    pub fn heal(&self, op: &str) {
        self.armed.lock().unwrap().remove(op);
    }

    pub fn heal_all(&self) {
        self.armed.lock().unwrap().clear();
    }

    fn check(&self, op: &str) -> Result<()> {
        let mut armed = self.armed.lock().unwrap();
        match armed.get_mut(op) {
            None => Ok(()),
            Some(0) => Err(NostalgicError::storage(format!("injected failure: {op}"))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
        }
    }

    /// Wrap every port of `inner` so its calls consult this switchboard.
    pub fn wrap(self: &Arc<Self>, inner: Repositories) -> Repositories {
        Repositories {
            entities: Arc::new(Faulty::new(self, inner.entities)),
            counters: Arc::new(Faulty::new(self, inner.counters)),
            lists: Arc::new(Faulty::new(self, inner.lists)),
            sorted_sets: Arc::new(Faulty::new(self, inner.sorted_sets)),
            hashes: Arc::new(Faulty::new(self, inner.hashes)),
            url_mappings: Arc::new(Faulty::new(self, inner.url_mappings)),
            markers: Arc::new(Faulty::new(self, inner.markers)),
            daily: Arc::new(Faulty::new(self, inner.daily)),
        }
    }
}

struct Faulty<T: ?Sized> {
    faults: Arc<Faults>,
    inner: Arc<T>,
}

impl<T: ?Sized> Faulty<T> {
    fn new(faults: &Arc<Faults>, inner: Arc<T>) -> Self {
        Self {
            faults: faults.clone(),
            inner,
        }
    }
}

#[async_trait]
impl EntityRepository for Faulty<dyn EntityRepository> {
    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.faults.check("entities.save")?;
        self.inner.save(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.faults.check("entities.get")?;
        self.inner.get(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.faults.check("entities.exists")?;
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.faults.check("entities.delete")?;
        self.inner.delete(key).await
    }
}

#[async_trait]
impl CounterRepository for Faulty<dyn CounterRepository> {
    async fn get(&self, key: &str) -> Result<i64> {
        self.faults.check("counters.get")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: i64) -> Result<()> {
        self.faults.check("counters.set")?;
        self.inner.set(key, value).await
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.faults.check("counters.increment")?;
        self.inner.increment(key, delta).await
    }

    async fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        self.faults.check("counters.decrement")?;
        self.inner.decrement(key, delta).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.faults.check("counters.delete")?;
        self.inner.delete(key).await
    }
}

#[async_trait]
impl ListRepository for Faulty<dyn ListRepository> {
    async fn push(&self, key: &str, item_id: &str, value: &str) -> Result<u64> {
        self.faults.check("lists.push")?;
        self.inner.push(key, item_id, value).await
    }

    async fn range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: ListOrder,
    ) -> Result<Vec<ListItem>> {
        self.faults.check("lists.range")?;
        self.inner.range(key, start, stop, order).await
    }

    async fn length(&self, key: &str) -> Result<u64> {
        self.faults.check("lists.length")?;
        self.inner.length(key).await
    }

    async fn trim(&self, key: &str, start: i64, stop: i64) -> Result<u64> {
        self.faults.check("lists.trim")?;
        self.inner.trim(key, start, stop).await
    }

    async fn get_item(&self, key: &str, item_id: &str) -> Result<Option<String>> {
        self.faults.check("lists.get_item")?;
        self.inner.get_item(key, item_id).await
    }

    async fn update_item(&self, key: &str, item_id: &str, value: &str) -> Result<bool> {
        self.faults.check("lists.update_item")?;
        self.inner.update_item(key, item_id, value).await
    }

    async fn remove_item(&self, key: &str, item_id: &str) -> Result<bool> {
        self.faults.check("lists.remove_item")?;
        self.inner.remove_item(key, item_id).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.faults.check("lists.clear")?;
        self.inner.clear(key).await
    }
}

#[async_trait]
impl SortedSetRepository for Faulty<dyn SortedSetRepository> {
    async fn add(&self, key: &str, member: &str, score: i64) -> Result<()> {
        self.faults.check("sorted_sets.add")?;
        self.inner.add(key, member, score).await
    }

    async fn add_if_greater(&self, key: &str, member: &str, score: i64) -> Result<bool> {
        self.faults.check("sorted_sets.add_if_greater")?;
        self.inner.add_if_greater(key, member, score).await
    }

    async fn remove(&self, key: &str, member: &str) -> Result<bool> {
        self.faults.check("sorted_sets.remove")?;
        self.inner.remove(key, member).await
    }

    async fn score(&self, key: &str, member: &str) -> Result<Option<i64>> {
        self.faults.check("sorted_sets.score")?;
        self.inner.score(key, member).await
    }

    async fn range_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        ascending: bool,
    ) -> Result<Vec<ScoredMember>> {
        self.faults.check("sorted_sets.range_with_scores")?;
        self.inner.range_with_scores(key, start, stop, ascending).await
    }

    async fn count(&self, key: &str) -> Result<u64> {
        self.faults.check("sorted_sets.count")?;
        self.inner.count(key).await
    }

    async fn remove_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.faults.check("sorted_sets.remove_range")?;
        self.inner.remove_range(key, start, stop).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.faults.check("sorted_sets.clear")?;
        self.inner.clear(key).await
    }
}

#[async_trait]
impl HashRepository for Faulty<dyn HashRepository> {
    async fn set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.faults.check("hashes.set")?;
        self.inner.set(key, field, value).await
    }

    async fn get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.faults.check("hashes.get")?;
        self.inner.get(key, field).await
    }

    async fn get_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        self.faults.check("hashes.get_all")?;
        self.inner.get_all(key).await
    }

    async fn remove(&self, key: &str, field: &str) -> Result<bool> {
        self.faults.check("hashes.remove")?;
        self.inner.remove(key, field).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.faults.check("hashes.clear")?;
        self.inner.clear(key).await
    }
}

#[async_trait]
impl UrlMappingRepository for Faulty<dyn UrlMappingRepository> {
    async fn reserve(&self, kind: ServiceKind, url: &str, id: &str) -> Result<bool> {
        self.faults.check("url_mappings.reserve")?;
        self.inner.reserve(kind, url, id).await
    }

    async fn get_id(&self, kind: ServiceKind, url: &str) -> Result<Option<String>> {
        self.faults.check("url_mappings.get_id")?;
        self.inner.get_id(kind, url).await
    }

    async fn remove(&self, kind: ServiceKind, url: &str) -> Result<bool> {
        self.faults.check("url_mappings.remove")?;
        self.inner.remove(kind, url).await
    }

    async fn list(&self, kind: ServiceKind) -> Result<Vec<UrlMapping>> {
        self.faults.check("url_mappings.list")?;
        self.inner.list(kind).await
    }
}

#[async_trait]
impl MarkerRepository for Faulty<dyn MarkerRepository> {
    async fn try_acquire(
        &self,
        marker: &MarkerKey,
        value: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.faults.check("markers.try_acquire")?;
        self.inner.try_acquire(marker, value, expires_at, now).await
    }

    async fn get(&self, marker: &MarkerKey, now: DateTime<Utc>) -> Result<Option<String>> {
        self.faults.check("markers.get")?;
        self.inner.get(marker, now).await
    }

    async fn set_value(&self, marker: &MarkerKey, value: &str) -> Result<bool> {
        self.faults.check("markers.set_value")?;
        self.inner.set_value(marker, value).await
    }

    async fn compare_and_set(
        &self,
        marker: &MarkerKey,
        expected: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.faults.check("markers.compare_and_set")?;
        self.inner.compare_and_set(marker, expected, value, now).await
    }

    async fn remove(&self, marker: &MarkerKey) -> Result<bool> {
        self.faults.check("markers.remove")?;
        self.inner.remove(marker).await
    }

    async fn purge_widget(&self, widget: &str) -> Result<u64> {
        self.faults.check("markers.purge_widget")?;
        self.inner.purge_widget(widget).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        self.faults.check("markers.purge_expired")?;
        self.inner.purge_expired(now).await
    }
}

#[async_trait]
impl DailyAggregateRepository for Faulty<dyn DailyAggregateRepository> {
    async fn increment(&self, widget: &str, day: NaiveDate, delta: i64) -> Result<i64> {
        self.faults.check("daily.increment")?;
        self.inner.increment(widget, day, delta).await
    }

    async fn get(&self, widget: &str, day: NaiveDate) -> Result<i64> {
        self.faults.check("daily.get")?;
        self.inner.get(widget, day).await
    }

    async fn sum_range(&self, widget: &str, from: NaiveDate, to: NaiveDate) -> Result<i64> {
        self.faults.check("daily.sum_range")?;
        self.inner.sum_range(widget, from, to).await
    }

    async fn clear(&self, widget: &str) -> Result<u64> {
        self.faults.check("daily.clear")?;
        self.inner.clear(widget).await
    }
}
