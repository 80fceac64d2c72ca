// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! `./nostalgic.toml` > `~/.config/nostalgic/nostalgic.toml` > `/etc/nostalgic/nostalgic.toml`,
//! with `NOSTALGIC_` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NostalgicConfig;

/// Config file name searched for in every hierarchy level.
pub const CONFIG_FILE_NAME: &str = "nostalgic.toml";

/// System-wide config location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/nostalgic/nostalgic.toml";

/// Sections recognised in `NOSTALGIC_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "server", "storage", "security", "calendar", "ranking", "bbs", "webhook", "sweep",
];

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("nostalgic").join(CONFIG_FILE_NAME))
        .unwrap_or_default()
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<NostalgicConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<NostalgicConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NostalgicConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NostalgicConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NostalgicConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NostalgicConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Maps `NOSTALGIC_BBS_POST_COOLDOWN_SECS` to `bbs.post_cooldown_secs`.
///
/// Only the first underscore after a known section becomes a dot, so key
/// names that contain underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("NOSTALGIC_").map(|key| {
        let key_str = key.as_str();
        for section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
