// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers and small enums shared across the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{NostalgicError, Result};

/// Maximum length of a public widget id.
pub const MAX_PUBLIC_ID_LEN: usize = 64;

/// The four widget kinds served by the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Counter,
    Like,
    Ranking,
    Bbs,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Counter,
        ServiceKind::Like,
        ServiceKind::Ranking,
        ServiceKind::Bbs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Counter => "counter",
            ServiceKind::Like => "like",
            ServiceKind::Ranking => "ranking",
            ServiceKind::Bbs => "bbs",
        }
    }
}

/// Public, URL-safe widget identifier. Safe to publish; never a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicId(String);

impl PublicId {
    /// Parse an id received from a caller or from storage.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NostalgicError::validation("id is required"));
        }
        if raw.len() > MAX_PUBLIC_ID_LEN
            || !raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(NostalgicError::validation("invalid id"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PublicId {
    type Error = NostalgicError;

    fn try_from(value: String) -> Result<Self> {
        PublicId::parse(&value)
    }
}

impl From<PublicId> for String {
    fn from(id: PublicId) -> Self {
        id.0
    }
}

/// Opaque hash identifying an anonymous actor.
///
/// Doubles as the BBS author's edit credential, so it is never rendered
/// into public views.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitorHash(pub String);

impl VisitorHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VisitorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VisitorHash([redacted])")
    }
}

/// Display order of a ranking widget.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Highest score first.
    #[default]
    Desc,
    /// Lowest score first.
    Asc,
}

/// Which number a counter display request asks for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CounterWindow {
    #[default]
    Total,
    Today,
    Yesterday,
    Week,
    Month,
}

/// Output format of a display request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    #[default]
    Json,
    Text,
    Image,
}
