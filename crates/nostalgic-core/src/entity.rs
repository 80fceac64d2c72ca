// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Widget entities as persisted in the entity repository.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{PublicId, ServiceKind, SortOrder};

/// Fields every widget carries regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMeta {
    pub id: PublicId,
    /// Canonicalized owner URL.
    pub url: String,
    pub created: DateTime<Utc>,
}

/// Behaviour shared by the concrete entity types.
pub trait WidgetEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ServiceKind;

    fn meta(&self) -> &WidgetMeta;

    fn webhook_url(&self) -> Option<&str>;

    /// Timestamp of the most recent visitor-driven mutation, used by the retention sweep.
    fn last_activity(&self) -> DateTime<Utc>;

    fn id(&self) -> &PublicId {
        &self.meta().id
    }

    fn url(&self) -> &str {
        &self.meta().url
    }
}

/// Settings shared by counter and like widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterEntity {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    #[serde(default)]
    pub settings: BasicSettings,
    pub total_count: u64,
    #[serde(default)]
    pub last_visit: Option<DateTime<Utc>>,
}

impl WidgetEntity for CounterEntity {
    const KIND: ServiceKind = ServiceKind::Counter;

    fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    fn webhook_url(&self) -> Option<&str> {
        self.settings.webhook_url.as_deref()
    }

    fn last_activity(&self) -> DateTime<Utc> {
        self.last_visit.unwrap_or(self.meta.created)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEntity {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    #[serde(default)]
    pub settings: BasicSettings,
    pub total_likes: u64,
    #[serde(default)]
    pub last_like: Option<DateTime<Utc>>,
}

impl WidgetEntity for LikeEntity {
    const KIND: ServiceKind = ServiceKind::Like;

    fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    fn webhook_url(&self) -> Option<&str> {
        self.settings.webhook_url.as_deref()
    }

    fn last_activity(&self) -> DateTime<Utc> {
        self.last_like.unwrap_or(self.meta.created)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub max_entries: u32,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntity {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub settings: RankingSettings,
    pub total_entries: u64,
    #[serde(default)]
    pub last_submit: Option<DateTime<Utc>>,
}

impl WidgetEntity for RankingEntity {
    const KIND: ServiceKind = ServiceKind::Ranking;

    fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    fn webhook_url(&self) -> Option<&str> {
        self.settings.webhook_url.as_deref()
    }

    fn last_activity(&self) -> DateTime<Utc> {
        self.last_submit.unwrap_or(self.meta.created)
    }
}

/// One leaderboard row as presented to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub rank: u32,
    pub name: String,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_score: Option<String>,
}

/// An owner-defined dropdown offered on the BBS post form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDefinition {
    pub label: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub messages_per_page: u32,
    pub max_messages: u32,
    #[serde(default)]
    pub selects: Vec<SelectDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsEntity {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub settings: BbsSettings,
    pub total_messages: u64,
    #[serde(default)]
    pub last_message: Option<DateTime<Utc>>,
}

impl WidgetEntity for BbsEntity {
    const KIND: ServiceKind = ServiceKind::Bbs;

    fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    fn webhook_url(&self) -> Option<&str> {
        self.settings.webhook_url.as_deref()
    }

    fn last_activity(&self) -> DateTime<Utc> {
        self.last_message.unwrap_or(self.meta.created)
    }
}

/// A stored BBS message, including the author's edit credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BbsMessage {
    pub id: String,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub selects: Vec<Option<String>>,
    pub author_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
}
