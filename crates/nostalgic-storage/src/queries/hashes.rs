// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String field maps.

use nostalgic_core::NostalgicError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn set_field(
    db: &Database,
    key: &str,
    field: &str,
    value: &str,
) -> Result<(), NostalgicError> {
    let (key, field, value) = (key.to_string(), field.to_string(), value.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO hash_fields (key, field, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key, field) DO UPDATE SET value = excluded.value",
                params![key, field, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_field(
    db: &Database,
    key: &str,
    field: &str,
) -> Result<Option<String>, NostalgicError> {
    let (key, field) = (key.to_string(), field.to_string());
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM hash_fields WHERE key = ?1 AND field = ?2",
                params![key, field],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_all_fields(
    db: &Database,
    key: &str,
) -> Result<Vec<(String, String)>, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT field, value FROM hash_fields WHERE key = ?1 ORDER BY field",
            )?;
            let rows = stmt.query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let fields = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(fields)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_field(db: &Database, key: &str, field: &str) -> Result<bool, NostalgicError> {
    let (key, field) = (key.to_string(), field.to_string());
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM hash_fields WHERE key = ?1 AND field = ?2",
                params![key, field],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn clear_hash(db: &Database, key: &str) -> Result<(), NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM hash_fields WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
