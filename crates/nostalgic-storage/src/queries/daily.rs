// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date-partitioned per-widget counts.

use chrono::NaiveDate;
use nostalgic_core::NostalgicError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Add `delta` to the day's row (floored at zero) and return the new count.
pub async fn increment_day(
    db: &Database,
    widget: &str,
    day: NaiveDate,
    delta: i64,
) -> Result<i64, NostalgicError> {
    let widget = widget.to_string();
    let day = day_key(day);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO daily_aggregates (widget, day, count) VALUES (?1, ?2, MAX(?3, 0))
                 ON CONFLICT(widget, day) DO UPDATE SET count = MAX(daily_aggregates.count + ?3, 0)
                 RETURNING count",
                params![widget, day, delta],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_day(db: &Database, widget: &str, day: NaiveDate) -> Result<i64, NostalgicError> {
    let widget = widget.to_string();
    let day = day_key(day);
    db.connection()
        .call(move |conn| {
            let count: Option<i64> = conn
                .query_row(
                    "SELECT count FROM daily_aggregates WHERE widget = ?1 AND day = ?2",
                    params![widget, day],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(count.unwrap_or(0))
        })
        .await
        .map_err(map_tr_err)
}

/// Sum over the inclusive date range.
pub async fn sum_days(
    db: &Database,
    widget: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<i64, NostalgicError> {
    let widget = widget.to_string();
    let (from, to) = (day_key(from), day_key(to));
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COALESCE(SUM(count), 0) FROM daily_aggregates
                 WHERE widget = ?1 AND day >= ?2 AND day <= ?3",
                params![widget, from, to],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn clear_days(db: &Database, widget: &str) -> Result<u64, NostalgicError> {
    let widget = widget.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM daily_aggregates WHERE widget = ?1",
                params![widget],
            )?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}
