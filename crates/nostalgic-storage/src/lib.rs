// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite storage for the Nostalgic widget backend.
//!
//! A single `tokio-rusqlite` connection serializes all statements. Each
//! storage shape (documents, counters, lists, sorted sets, hashes, URL
//! mappings, markers, daily aggregates) has its own query module, and
//! [`SqliteRepositories`] exposes them through the core repository ports.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteRepositories;
pub use database::{Database, map_tr_err};
