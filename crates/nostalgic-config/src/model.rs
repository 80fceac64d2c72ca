// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NostalgicConfig {
    /// HTTP listener and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Visitor hashing salt and admin token.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Calendar used for daily dedup windows and aggregates.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Ranking widget limits.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// BBS widget limits.
    #[serde(default)]
    pub bbs: BbsConfig,

    /// Outbound webhook delivery.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Retention sweep.
    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable SQLite WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    "nostalgic.db".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Salt mixed into visitor and author hashes.
    #[serde(default = "default_visitor_salt")]
    pub visitor_salt: String,

    /// Bearer token for the admin sweep endpoint. `None` disables the endpoint.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            visitor_salt: default_visitor_salt(),
            admin_token: None,
        }
    }
}

/// Compiled-in salt; startup warns while it is still in use.
pub const DEFAULT_VISITOR_SALT: &str = "nostalgic";

fn default_visitor_salt() -> String {
    DEFAULT_VISITOR_SALT.to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Offset from UTC, in minutes, of the local day boundary.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    #[serde(default = "default_ranking_max_entries")]
    pub default_max_entries: u32,

    #[serde(default = "default_ranking_cap")]
    pub max_entries_cap: u32,

    #[serde(default = "default_cooldown_secs")]
    pub submit_cooldown_secs: u64,

    #[serde(default = "default_name_len")]
    pub name_max_len: usize,

    #[serde(default = "default_name_len")]
    pub display_score_max_len: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_max_entries: default_ranking_max_entries(),
            max_entries_cap: default_ranking_cap(),
            submit_cooldown_secs: default_cooldown_secs(),
            name_max_len: default_name_len(),
            display_score_max_len: default_name_len(),
        }
    }
}

fn default_ranking_max_entries() -> u32 {
    100
}

fn default_ranking_cap() -> u32 {
    1000
}

fn default_cooldown_secs() -> u64 {
    10
}

fn default_name_len() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BbsConfig {
    #[serde(default = "default_messages_per_page")]
    pub default_messages_per_page: u32,

    #[serde(default = "default_max_messages_per_page")]
    pub max_messages_per_page: u32,

    #[serde(default = "default_max_messages")]
    pub default_max_messages: u32,

    #[serde(default = "default_max_messages_cap")]
    pub max_messages_cap: u32,

    #[serde(default = "default_cooldown_secs")]
    pub post_cooldown_secs: u64,

    #[serde(default = "default_message_max_len")]
    pub message_max_len: usize,

    #[serde(default = "default_name_len")]
    pub author_max_len: usize,

    #[serde(default = "default_author")]
    pub default_author: String,

    /// Case-insensitive words rejected by the content filter.
    #[serde(default)]
    pub banned_words: Vec<String>,
}

impl Default for BbsConfig {
    fn default() -> Self {
        Self {
            default_messages_per_page: default_messages_per_page(),
            max_messages_per_page: default_max_messages_per_page(),
            default_max_messages: default_max_messages(),
            max_messages_cap: default_max_messages_cap(),
            post_cooldown_secs: default_cooldown_secs(),
            message_max_len: default_message_max_len(),
            author_max_len: default_name_len(),
            default_author: default_author(),
            banned_words: Vec::new(),
        }
    }
}

fn default_messages_per_page() -> u32 {
    10
}

fn default_max_messages_per_page() -> u32 {
    100
}

fn default_max_messages() -> u32 {
    100
}

fn default_max_messages_cap() -> u32 {
    1000
}

fn default_message_max_len() -> usize {
    200
}

fn default_author() -> String {
    "Anonymous".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,

    /// Private IPs webhook targets may still resolve to.
    #[serde(default)]
    pub allowed_private_ips: Vec<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_webhook_timeout(),
            allowed_private_ips: Vec::new(),
        }
    }
}

fn default_webhook_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Widgets idle for longer than this are purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Chance per request of running the sweep in the background. 0 disables.
    #[serde(default = "default_trigger_probability")]
    pub trigger_probability: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            trigger_probability: default_trigger_probability(),
        }
    }
}

fn default_retention_days() -> u32 {
    365
}

fn default_trigger_probability() -> f64 {
    0.01
}
