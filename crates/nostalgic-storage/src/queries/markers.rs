// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dedup and cooldown markers.
//!
//! SQLite has no per-row expiry, so each row carries `expires_at` and readers
//! treat expired rows as absent. [`try_acquire`] deletes expired rows for the
//! same (widget, actor, type) and then inserts with `INSERT OR IGNORE` in one
//! transaction; `changes() == 1` is the "newly created" signal every dedup
//! decision is built on.

use chrono::{DateTime, Utc};
use nostalgic_core::NostalgicError;
use nostalgic_core::traits::MarkerKey;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn try_acquire(
    db: &Database,
    marker: &MarkerKey,
    value: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, NostalgicError> {
    let marker = marker.clone();
    let value = value.to_string();
    let (expires_at, now) = (expires_at.timestamp_millis(), now.timestamp_millis());
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM markers
                 WHERE widget = ?1 AND actor = ?2 AND marker_type = ?3 AND expires_at <= ?4",
                params![marker.widget, marker.actor, marker.marker_type, now],
            )?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO markers
                     (widget, actor, marker_type, partition_key, value, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    marker.widget,
                    marker.actor,
                    marker.marker_type,
                    marker.partition,
                    value,
                    expires_at,
                ],
            )?;
            tx.commit()?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Value of a live marker.
pub async fn get_marker(
    db: &Database,
    marker: &MarkerKey,
    now: DateTime<Utc>,
) -> Result<Option<String>, NostalgicError> {
    let marker = marker.clone();
    let now = now.timestamp_millis();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM markers
                 WHERE widget = ?1 AND actor = ?2 AND marker_type = ?3 AND partition_key = ?4
                   AND expires_at > ?5",
                params![
                    marker.widget,
                    marker.actor,
                    marker.marker_type,
                    marker.partition,
                    now
                ],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Rewrite the value in place; the expiry is untouched.
pub async fn set_marker_value(
    db: &Database,
    marker: &MarkerKey,
    value: &str,
) -> Result<bool, NostalgicError> {
    let marker = marker.clone();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE markers SET value = ?5
                 WHERE widget = ?1 AND actor = ?2 AND marker_type = ?3 AND partition_key = ?4",
                params![
                    marker.widget,
                    marker.actor,
                    marker.marker_type,
                    marker.partition,
                    value
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Swap the value of a live marker from `expected` to `value`.
pub async fn compare_and_set_marker(
    db: &Database,
    marker: &MarkerKey,
    expected: &str,
    value: &str,
    now: DateTime<Utc>,
) -> Result<bool, NostalgicError> {
    let marker = marker.clone();
    let (expected, value) = (expected.to_string(), value.to_string());
    let now = now.timestamp_millis();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE markers SET value = ?6
                 WHERE widget = ?1 AND actor = ?2 AND marker_type = ?3 AND partition_key = ?4
                   AND value = ?5 AND expires_at > ?7",
                params![
                    marker.widget,
                    marker.actor,
                    marker.marker_type,
                    marker.partition,
                    expected,
                    value,
                    now
                ],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_marker(db: &Database, marker: &MarkerKey) -> Result<bool, NostalgicError> {
    let marker = marker.clone();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM markers
                 WHERE widget = ?1 AND actor = ?2 AND marker_type = ?3 AND partition_key = ?4",
                params![
                    marker.widget,
                    marker.actor,
                    marker.marker_type,
                    marker.partition
                ],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn purge_widget_markers(db: &Database, widget: &str) -> Result<u64, NostalgicError> {
    let widget = widget.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM markers WHERE widget = ?1", params![widget])?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn purge_expired_markers(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<u64, NostalgicError> {
    let now = now.timestamp_millis();
    db.connection()
        .call(move |conn| {
            let removed =
                conn.execute("DELETE FROM markers WHERE expires_at <= ?1", params![now])?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}
