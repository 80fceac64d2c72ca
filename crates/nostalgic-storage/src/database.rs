// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread, which is what makes each repository call atomic with respect to
//! every other call. Do NOT create additional Connection instances for writes.

use nostalgic_config::model::StorageConfig;
use nostalgic_core::NostalgicError;
use tracing::{debug, info};

use crate::migrations::run_migrations;

/// Handle to the single SQLite writer connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and apply migrations.
    pub async fn open(path: &str) -> Result<Self, NostalgicError> {
        Self::open_with(path, true).await
    }

    /// Open using the `[storage]` config section.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, NostalgicError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    /// Open a private in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, NostalgicError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(NostalgicError::storage)?;
        let db = Self { conn };
        db.initialize(false).await?;
        Ok(db)
    }

    async fn open_with(path: &str, wal_mode: bool) -> Result<Self, NostalgicError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(NostalgicError::storage)?;
        let db = Self { conn };
        db.initialize(wal_mode).await?;
        info!(path = %path, wal_mode, "database opened");
        Ok(db)
    }

    async fn initialize(&self, wal_mode: bool) -> Result<(), NostalgicError> {
        let migrated = self
            .conn
            .call(move |conn| -> Result<Result<(), NostalgicError>, rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch(
                    "PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;
                     PRAGMA foreign_keys = ON;",
                )?;
                Ok(run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?;
        migrated?;
        debug!("database initialized");
        Ok(())
    }

    /// The underlying async connection, for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Cheap liveness probe.
    pub async fn health_check(&self) -> Result<(), NostalgicError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), NostalgicError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), NostalgicError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(NostalgicError::storage)
    }
}

/// Convert a tokio-rusqlite error into the storage variant.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> NostalgicError {
    NostalgicError::Storage {
        source: Box::new(e),
    }
}
