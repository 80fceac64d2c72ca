// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner URL to public id, one row per (kind, url).

use nostalgic_core::traits::UrlMapping;
use nostalgic_core::{NostalgicError, ServiceKind};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Insert the mapping unless the URL is already registered for this kind.
pub async fn reserve_url(
    db: &Database,
    kind: ServiceKind,
    url: &str,
    id: &str,
) -> Result<bool, NostalgicError> {
    let (url, id) = (url.to_string(), id.to_string());
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO url_mappings (kind, url, id) VALUES (?1, ?2, ?3)",
                params![kind.as_str(), url, id],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_mapped_id(
    db: &Database,
    kind: ServiceKind,
    url: &str,
) -> Result<Option<String>, NostalgicError> {
    let url = url.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id FROM url_mappings WHERE kind = ?1 AND url = ?2",
                params![kind.as_str(), url],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_url(db: &Database, kind: ServiceKind, url: &str) -> Result<bool, NostalgicError> {
    let url = url.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM url_mappings WHERE kind = ?1 AND url = ?2",
                params![kind.as_str(), url],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Every mapping of one kind, oldest registration first.
pub async fn list_urls(db: &Database, kind: ServiceKind) -> Result<Vec<UrlMapping>, NostalgicError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT url, id FROM url_mappings WHERE kind = ?1 ORDER BY created_at, url",
            )?;
            let rows = stmt.query_map(params![kind.as_str()], |row| {
                Ok(UrlMapping {
                    url: row.get(0)?,
                    id: row.get(1)?,
                })
            })?;
            let mappings = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(mappings)
        })
        .await
        .map_err(map_tr_err)
}
