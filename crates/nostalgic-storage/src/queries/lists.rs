// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only lists ordered by insertion sequence.

use nostalgic_core::NostalgicError;
use nostalgic_core::traits::{ListItem, ListOrder};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::resolve_range;

fn list_len(conn: &Connection, key: &str) -> Result<i64, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM list_items WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
}

/// Append an item and return the new length.
pub async fn push_item(
    db: &Database,
    key: &str,
    item_id: &str,
    value: &str,
) -> Result<u64, NostalgicError> {
    let key = key.to_string();
    let item_id = item_id.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO list_items (key, item_id, value) VALUES (?1, ?2, ?3)",
                params![key, item_id, value],
            )?;
            Ok(list_len(conn, &key)? as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Inclusive index range in the requested order.
pub async fn range_items(
    db: &Database,
    key: &str,
    start: i64,
    stop: i64,
    order: ListOrder,
) -> Result<Vec<ListItem>, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let len = list_len(conn, &key)?;
            let Some((offset, limit)) = resolve_range(len, start, stop) else {
                return Ok(Vec::new());
            };
            let sql = match order {
                ListOrder::NewestFirst => {
                    "SELECT item_id, value FROM list_items WHERE key = ?1
                     ORDER BY seq DESC LIMIT ?2 OFFSET ?3"
                }
                ListOrder::OldestFirst => {
                    "SELECT item_id, value FROM list_items WHERE key = ?1
                     ORDER BY seq ASC LIMIT ?2 OFFSET ?3"
                }
            };
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params![key, limit, offset], |row| {
                Ok(ListItem {
                    item_id: row.get(0)?,
                    value: row.get(1)?,
                })
            })?;
            let items = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_length(db: &Database, key: &str) -> Result<u64, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| Ok(list_len(conn, &key)? as u64))
        .await
        .map_err(map_tr_err)
}

/// Keep newest-first indices `start..=stop`, delete the rest. Returns the number removed.
pub async fn trim_list(
    db: &Database,
    key: &str,
    start: i64,
    stop: i64,
) -> Result<u64, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let len = list_len(&tx, &key)?;
            let removed = match resolve_range(len, start, stop) {
                Some((offset, limit)) => tx.execute(
                    "DELETE FROM list_items WHERE key = ?1 AND seq NOT IN (
                         SELECT seq FROM list_items WHERE key = ?1
                         ORDER BY seq DESC LIMIT ?2 OFFSET ?3
                     )",
                    params![key, limit, offset],
                )?,
                None => tx.execute("DELETE FROM list_items WHERE key = ?1", params![key])?,
            };
            tx.commit()?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_item(
    db: &Database,
    key: &str,
    item_id: &str,
) -> Result<Option<String>, NostalgicError> {
    let key = key.to_string();
    let item_id = item_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM list_items WHERE key = ?1 AND item_id = ?2",
                params![key, item_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Rewrite an item without changing its position.
pub async fn update_item(
    db: &Database,
    key: &str,
    item_id: &str,
    value: &str,
) -> Result<bool, NostalgicError> {
    let key = key.to_string();
    let item_id = item_id.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE list_items SET value = ?3 WHERE key = ?1 AND item_id = ?2",
                params![key, item_id, value],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_item(db: &Database, key: &str, item_id: &str) -> Result<bool, NostalgicError> {
    let key = key.to_string();
    let item_id = item_id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM list_items WHERE key = ?1 AND item_id = ?2",
                params![key, item_id],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn clear_list(db: &Database, key: &str) -> Result<(), NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM list_items WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;

    async fn push_n(db: &Database, key: &str, n: usize) {
        for i in 1..=n {
            push_item(db, key, &i.to_string(), &format!("m{i}"))
                .await
                .unwrap();
        }
    }

    fn values(items: &[ListItem]) -> Vec<&str> {
        items.iter().map(|i| i.value.as_str()).collect()
    }

    #[tokio::test]
    async fn push_returns_length_and_range_is_newest_first() {
        let (db, _dir) = setup_db().await;
        assert_eq!(push_item(&db, "l", "1", "m1").await.unwrap(), 1);
        assert_eq!(push_item(&db, "l", "2", "m2").await.unwrap(), 2);
        push_item(&db, "l", "3", "m3").await.unwrap();

        let newest = range_items(&db, "l", 0, -1, ListOrder::NewestFirst)
            .await
            .unwrap();
        assert_eq!(values(&newest), vec!["m3", "m2", "m1"]);

        let oldest = range_items(&db, "l", 0, 1, ListOrder::OldestFirst)
            .await
            .unwrap();
        assert_eq!(values(&oldest), vec!["m1", "m2"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn trim_keeps_newest() {
        let (db, _dir) = setup_db().await;
        push_n(&db, "l", 5).await;

        let removed = trim_list(&db, "l", 0, 2).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(list_length(&db, "l").await.unwrap(), 3);

        let left = range_items(&db, "l", 0, -1, ListOrder::OldestFirst)
            .await
            .unwrap();
        assert_eq!(values(&left), vec!["m3", "m4", "m5"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn trim_within_bounds_removes_nothing() {
        let (db, _dir) = setup_db().await;
        push_n(&db, "l", 2).await;
        assert_eq!(trim_list(&db, "l", 0, 9).await.unwrap(), 0);
        assert_eq!(list_length(&db, "l").await.unwrap(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_and_remove_by_item_id() {
        let (db, _dir) = setup_db().await;
        push_n(&db, "l", 3).await;

        assert!(update_item(&db, "l", "2", "edited").await.unwrap());
        assert!(!update_item(&db, "l", "99", "x").await.unwrap());
        assert_eq!(get_item(&db, "l", "2").await.unwrap().as_deref(), Some("edited"));

        assert!(remove_item(&db, "l", "1").await.unwrap());
        let left = range_items(&db, "l", 0, -1, ListOrder::OldestFirst)
            .await
            .unwrap();
        assert_eq!(values(&left), vec!["edited", "m3"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn lists_are_isolated_by_key() {
        let (db, _dir) = setup_db().await;
        push_n(&db, "a", 2).await;
        push_n(&db, "b", 1).await;
        clear_list(&db, "a").await.unwrap();
        assert_eq!(list_length(&db, "a").await.unwrap(), 0);
        assert_eq!(list_length(&db, "b").await.unwrap(), 1);
        db.close().await.unwrap();
    }
}
