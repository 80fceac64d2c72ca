// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composite storage keys of the form `{kind}:{id}[:suffix]`.

use crate::types::{PublicId, ServiceKind};

pub fn entity(kind: ServiceKind, id: &PublicId) -> String {
    format!("{kind}:{id}")
}

pub fn owner(kind: ServiceKind, id: &PublicId) -> String {
    format!("{kind}:{id}:owner")
}

pub fn total(kind: ServiceKind, id: &PublicId) -> String {
    format!("{kind}:{id}:total")
}

pub fn ranking_scores(id: &PublicId) -> String {
    format!("ranking:{id}:scores")
}

pub fn ranking_display(id: &PublicId) -> String {
    format!("ranking:{id}:display")
}

pub fn bbs_messages(id: &PublicId) -> String {
    format!("bbs:{id}:messages")
}

pub fn bbs_sequence(id: &PublicId) -> String {
    format!("bbs:{id}:seq")
}
