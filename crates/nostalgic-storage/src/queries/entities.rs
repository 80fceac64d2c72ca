// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON entity documents keyed by `{kind}:{id}[:suffix]`.

use nostalgic_core::NostalgicError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Insert or replace a document.
pub async fn save_entity(db: &Database, key: &str, value: &str) -> Result<(), NostalgicError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO entities (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_entity(db: &Database, key: &str) -> Result<Option<String>, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM entities WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn entity_exists(db: &Database, key: &str) -> Result<bool, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM entities WHERE key = ?1)",
                params![key],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Returns whether a row was removed.
pub async fn delete_entity(db: &Database, key: &str) -> Result<bool, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM entities WHERE key = ?1", params![key])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;

    #[tokio::test]
    async fn save_get_roundtrip_and_overwrite() {
        let (db, _dir) = setup_db().await;
        save_entity(&db, "counter:a", r#"{"n":1}"#).await.unwrap();
        assert_eq!(
            get_entity(&db, "counter:a").await.unwrap().as_deref(),
            Some(r#"{"n":1}"#)
        );

        save_entity(&db, "counter:a", r#"{"n":2}"#).await.unwrap();
        assert_eq!(
            get_entity(&db, "counter:a").await.unwrap().as_deref(),
            Some(r#"{"n":2}"#)
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn exists_and_delete() {
        let (db, _dir) = setup_db().await;
        assert!(!entity_exists(&db, "like:x").await.unwrap());
        save_entity(&db, "like:x", "{}").await.unwrap();
        assert!(entity_exists(&db, "like:x").await.unwrap());

        assert!(delete_entity(&db, "like:x").await.unwrap());
        assert!(!delete_entity(&db, "like:x").await.unwrap());
        assert!(get_entity(&db, "like:x").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
