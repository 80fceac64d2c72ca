// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::NostalgicConfig;

/// Offsets beyond these bounds do not exist on any civil clock.
const MIN_UTC_OFFSET_MINUTES: i32 = -12 * 60;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Shortest admin token accepted.
const MIN_ADMIN_TOKEN_LEN: usize = 16;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &NostalgicConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must not be 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.security.visitor_salt.is_empty() {
        fail("security.visitor_salt must not be empty".to_string());
    }

    if let Some(token) = &config.security.admin_token
        && token.len() < MIN_ADMIN_TOKEN_LEN
    {
        fail(format!(
            "security.admin_token must be at least {MIN_ADMIN_TOKEN_LEN} characters"
        ));
    }

    let offset = config.calendar.utc_offset_minutes;
    if !(MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&offset) {
        fail(format!(
            "calendar.utc_offset_minutes must be between {MIN_UTC_OFFSET_MINUTES} and {MAX_UTC_OFFSET_MINUTES}, got {offset}"
        ));
    }

    let ranking = &config.ranking;
    if ranking.default_max_entries == 0 {
        fail("ranking.default_max_entries must be at least 1".to_string());
    }
    if ranking.max_entries_cap < ranking.default_max_entries {
        fail(format!(
            "ranking.max_entries_cap ({}) must not be below ranking.default_max_entries ({})",
            ranking.max_entries_cap, ranking.default_max_entries
        ));
    }
    if ranking.name_max_len == 0 {
        fail("ranking.name_max_len must be at least 1".to_string());
    }

    let bbs = &config.bbs;
    if bbs.default_messages_per_page == 0 {
        fail("bbs.default_messages_per_page must be at least 1".to_string());
    }
    if bbs.max_messages_per_page < bbs.default_messages_per_page {
        fail(format!(
            "bbs.max_messages_per_page ({}) must not be below bbs.default_messages_per_page ({})",
            bbs.max_messages_per_page, bbs.default_messages_per_page
        ));
    }
    if bbs.default_max_messages == 0 {
        fail("bbs.default_max_messages must be at least 1".to_string());
    }
    if bbs.max_messages_cap < bbs.default_max_messages {
        fail(format!(
            "bbs.max_messages_cap ({}) must not be below bbs.default_max_messages ({})",
            bbs.max_messages_cap, bbs.default_max_messages
        ));
    }
    if bbs.message_max_len == 0 {
        fail("bbs.message_max_len must be at least 1".to_string());
    }
    if bbs.default_author.trim().is_empty() {
        fail("bbs.default_author must not be empty".to_string());
    }
    if bbs.default_author.chars().count() > bbs.author_max_len {
        fail("bbs.default_author must fit within bbs.author_max_len".to_string());
    }

    if config.webhook.timeout_secs == 0 {
        fail("webhook.timeout_secs must be at least 1".to_string());
    }
    for ip in &config.webhook.allowed_private_ips {
        if ip.parse::<std::net::IpAddr>().is_err() {
            fail(format!(
                "webhook.allowed_private_ips entry `{ip}` is not an IP address"
            ));
        }
    }

    if config.sweep.retention_days == 0 {
        fail("sweep.retention_days must be at least 1".to_string());
    }
    let p = config.sweep.trigger_probability;
    if !(0.0..=1.0).contains(&p) {
        fail(format!(
            "sweep.trigger_probability must be between 0 and 1, got {p}"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = NostalgicConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = NostalgicConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn short_admin_token_fails_validation() {
        let mut config = NostalgicConfig::default();
        config.security.admin_token = Some("short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "admin_token"));
    }

    #[test]
    fn probability_out_of_range_fails_validation() {
        let mut config = NostalgicConfig::default();
        config.sweep.trigger_probability = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "trigger_probability"));
    }

    #[test]
    fn caps_below_defaults_fail_validation() {
        let mut config = NostalgicConfig::default();
        config.ranking.max_entries_cap = 5;
        config.bbs.max_messages_cap = 5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "ranking.max_entries_cap"));
        assert!(has_message(&errors, "bbs.max_messages_cap"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = NostalgicConfig::default();
        config.server.port = 0;
        config.sweep.retention_days = 0;
        config.calendar.utc_offset_minutes = 2000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn invalid_allowed_private_ip_fails_validation() {
        let mut config = NostalgicConfig::default();
        config.webhook.allowed_private_ips = vec!["10.0.0.1".into(), "not-an-ip".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_message(&errors, "not-an-ip"));
    }
}
