// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind limits, lifted out of the loaded configuration.

use chrono::Duration;
use nostalgic_config::NostalgicConfig;

/// Longest title accepted for any widget.
pub const TITLE_MAX_LEN: usize = 100;

/// Most option-select dropdowns a BBS can define.
pub const MAX_BBS_SELECTS: usize = 3;

/// Most options in one dropdown.
pub const MAX_SELECT_OPTIONS: usize = 20;

#[derive(Debug, Clone)]
pub struct RankingPolicy {
    pub default_max_entries: u32,
    pub max_entries_cap: u32,
    pub submit_cooldown: Duration,
    pub name_max_len: usize,
    pub display_score_max_len: usize,
}

#[derive(Debug, Clone)]
pub struct BbsPolicy {
    pub default_messages_per_page: u32,
    pub max_messages_per_page: u32,
    pub default_max_messages: u32,
    pub max_messages_cap: u32,
    pub post_cooldown: Duration,
    pub message_max_len: usize,
    pub author_max_len: usize,
    pub default_author: String,
}

#[derive(Debug, Clone)]
pub struct ServicePolicy {
    pub ranking: RankingPolicy,
    pub bbs: BbsPolicy,
    /// Private addresses webhook targets may use anyway.
    pub allowed_private_ips: Vec<String>,
    pub retention_days: u32,
}

impl ServicePolicy {
    pub fn from_config(config: &NostalgicConfig) -> Self {
        let ranking = &config.ranking;
        let bbs = &config.bbs;
        Self {
            ranking: RankingPolicy {
                default_max_entries: ranking.default_max_entries,
                max_entries_cap: ranking.max_entries_cap,
                submit_cooldown: seconds(ranking.submit_cooldown_secs),
                name_max_len: ranking.name_max_len,
                display_score_max_len: ranking.display_score_max_len,
            },
            bbs: BbsPolicy {
                default_messages_per_page: bbs.default_messages_per_page,
                max_messages_per_page: bbs.max_messages_per_page,
                default_max_messages: bbs.default_max_messages,
                max_messages_cap: bbs.max_messages_cap,
                post_cooldown: seconds(bbs.post_cooldown_secs),
                message_max_len: bbs.message_max_len,
                author_max_len: bbs.author_max_len,
                default_author: bbs.default_author.clone(),
            },
            allowed_private_ips: config.webhook.allowed_private_ips.clone(),
            retention_days: config.sweep.retention_days,
        }
    }
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self::from_config(&NostalgicConfig::default())
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_config_defaults() {
        let policy = ServicePolicy::default();
        assert_eq!(policy.ranking.default_max_entries, 100);
        assert_eq!(policy.ranking.submit_cooldown, Duration::seconds(10));
        assert_eq!(policy.bbs.default_author, "Anonymous");
        assert_eq!(policy.retention_days, 365);
    }
}
