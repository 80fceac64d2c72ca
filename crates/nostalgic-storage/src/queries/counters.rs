// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integer counters updated by single-statement upserts.

use nostalgic_core::NostalgicError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Current value, `0` when absent.
pub async fn get_counter(db: &Database, key: &str) -> Result<i64, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let value: Option<i64> = conn
                .query_row(
                    "SELECT value FROM counters WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value.unwrap_or(0))
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_counter(db: &Database, key: &str, value: i64) -> Result<(), NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO counters (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Add `delta` and return the new value.
pub async fn increment_counter(
    db: &Database,
    key: &str,
    delta: i64,
) -> Result<i64, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO counters (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = counters.value + ?2
                 RETURNING value",
                params![key, delta],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Subtract `delta`, flooring at zero, and return the new value.
pub async fn decrement_counter(
    db: &Database,
    key: &str,
    delta: i64,
) -> Result<i64, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO counters (key, value) VALUES (?1, 0)
                 ON CONFLICT(key) DO UPDATE SET value = MAX(counters.value - ?2, 0)
                 RETURNING value",
                params![key, delta],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_counter(db: &Database, key: &str) -> Result<(), NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM counters WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
