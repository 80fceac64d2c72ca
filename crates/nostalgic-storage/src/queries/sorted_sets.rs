// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Score-ordered sets.
//!
//! Ascending order is `(score ASC, member DESC)` and descending order is its
//! exact reverse, so rank `0` ascending is always the entry a trim removes
//! first and the entry displayed last in descending order.

use nostalgic_core::NostalgicError;
use nostalgic_core::traits::ScoredMember;
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::resolve_range;

const ASCENDING: &str = "SELECT member, score FROM sorted_set_members WHERE key = ?1
                         ORDER BY score ASC, member DESC LIMIT ?2 OFFSET ?3";
const DESCENDING: &str = "SELECT member, score FROM sorted_set_members WHERE key = ?1
                          ORDER BY score DESC, member ASC LIMIT ?2 OFFSET ?3";

fn set_len(conn: &Connection, key: &str) -> Result<i64, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM sorted_set_members WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
}

fn select_range(
    conn: &Connection,
    key: &str,
    start: i64,
    stop: i64,
    ascending: bool,
) -> Result<Vec<ScoredMember>, rusqlite::Error> {
    let len = set_len(conn, key)?;
    let Some((offset, limit)) = resolve_range(len, start, stop) else {
        return Ok(Vec::new());
    };
    let mut stmt = conn.prepare(if ascending { ASCENDING } else { DESCENDING })?;
    let rows = stmt.query_map(params![key, limit, offset], |row| {
        Ok(ScoredMember {
            member: row.get(0)?,
            score: row.get(1)?,
        })
    })?;
    let members = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Insert or overwrite a member's score.
pub async fn add_member(
    db: &Database,
    key: &str,
    member: &str,
    score: i64,
) -> Result<(), NostalgicError> {
    let key = key.to_string();
    let member = member.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sorted_set_members (key, member, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key, member) DO UPDATE SET score = excluded.score",
                params![key, member, score],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a member or raise its score; a lower or equal score leaves the row alone.
pub async fn add_member_if_greater(
    db: &Database,
    key: &str,
    member: &str,
    score: i64,
) -> Result<bool, NostalgicError> {
    let key = key.to_string();
    let member = member.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO sorted_set_members (key, member, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key, member) DO UPDATE SET score = excluded.score
                 WHERE excluded.score > sorted_set_members.score",
                params![key, member, score],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_member(db: &Database, key: &str, member: &str) -> Result<bool, NostalgicError> {
    let key = key.to_string();
    let member = member.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM sorted_set_members WHERE key = ?1 AND member = ?2",
                params![key, member],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn member_score(
    db: &Database,
    key: &str,
    member: &str,
) -> Result<Option<i64>, NostalgicError> {
    let key = key.to_string();
    let member = member.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT score FROM sorted_set_members WHERE key = ?1 AND member = ?2",
                params![key, member],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn range_with_scores(
    db: &Database,
    key: &str,
    start: i64,
    stop: i64,
    ascending: bool,
) -> Result<Vec<ScoredMember>, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| select_range(conn, &key, start, stop, ascending))
        .await
        .map_err(map_tr_err)
}

pub async fn count_members(db: &Database, key: &str) -> Result<u64, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| Ok(set_len(conn, &key)? as u64))
        .await
        .map_err(map_tr_err)
}

/// Remove ascending ranks `start..=stop`, returning the removed members.
pub async fn remove_range(
    db: &Database,
    key: &str,
    start: i64,
    stop: i64,
) -> Result<Vec<String>, NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let doomed = select_range(&tx, &key, start, stop, true)?;
            {
                let mut delete = tx.prepare(
                    "DELETE FROM sorted_set_members WHERE key = ?1 AND member = ?2",
                )?;
                for entry in &doomed {
                    delete.execute(params![key, entry.member])?;
                }
            }
            tx.commit()?;
            Ok(doomed.into_iter().map(|e| e.member).collect())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn clear_set(db: &Database, key: &str) -> Result<(), NostalgicError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM sorted_set_members WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;

    fn members(entries: &[ScoredMember]) -> Vec<(&str, i64)> {
        entries
            .iter()
            .map(|e| (e.member.as_str(), e.score))
            .collect()
    }

    #[tokio::test]
    async fn add_is_upsert() {
        let (db, _dir) = setup_db().await;
        add_member(&db, "s", "alice", 10).await.unwrap();
        add_member(&db, "s", "alice", 3).await.unwrap();
        assert_eq!(member_score(&db, "s", "alice").await.unwrap(), Some(3));
        assert_eq!(count_members(&db, "s").await.unwrap(), 1);
        assert_eq!(member_score(&db, "s", "bob").await.unwrap(), None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn add_if_greater_only_raises() {
        let (db, _dir) = setup_db().await;
        assert!(add_member_if_greater(&db, "s", "alice", 10).await.unwrap());
        assert!(!add_member_if_greater(&db, "s", "alice", 10).await.unwrap());
        assert!(!add_member_if_greater(&db, "s", "alice", 4).await.unwrap());
        assert_eq!(member_score(&db, "s", "alice").await.unwrap(), Some(10));
        assert!(add_member_if_greater(&db, "s", "alice", 11).await.unwrap());
        assert_eq!(member_score(&db, "s", "alice").await.unwrap(), Some(11));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ranges_in_both_directions() {
        let (db, _dir) = setup_db().await;
        add_member(&db, "s", "a", 10).await.unwrap();
        add_member(&db, "s", "b", 30).await.unwrap();
        add_member(&db, "s", "c", 20).await.unwrap();

        let desc = range_with_scores(&db, "s", 0, -1, false).await.unwrap();
        assert_eq!(members(&desc), vec![("b", 30), ("c", 20), ("a", 10)]);

        let asc = range_with_scores(&db, "s", 0, 1, true).await.unwrap();
        assert_eq!(members(&asc), vec![("a", 10), ("c", 20)]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn remove_range_drops_lowest() {
        let (db, _dir) = setup_db().await;
        for (name, score) in [("a", 5), ("b", 1), ("c", 9), ("d", 3)] {
            add_member(&db, "s", name, score).await.unwrap();
        }
        let removed = remove_range(&db, "s", 0, 1).await.unwrap();
        assert_eq!(removed, vec!["b".to_string(), "d".to_string()]);
        assert_eq!(count_members(&db, "s").await.unwrap(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let (db, _dir) = setup_db().await;
        add_member(&db, "s", "a", 1).await.unwrap();
        add_member(&db, "s", "b", 2).await.unwrap();
        assert!(remove_member(&db, "s", "a").await.unwrap());
        assert!(!remove_member(&db, "s", "a").await.unwrap());
        clear_set(&db, "s").await.unwrap();
        assert_eq!(count_members(&db, "s").await.unwrap(), 0);
        db.close().await.unwrap();
    }
}
