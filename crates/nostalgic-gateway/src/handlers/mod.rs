// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One handler per widget kind, dispatching on the `action` parameter.

pub mod bbs;
pub mod counter;
pub mod like;
pub mod ranking;

use axum::response::Response;
use nostalgic_core::WidgetEntity;
use nostalgic_services::SettingsUpdate;

use crate::error::{ApiError, ok};
use crate::extract::Params;

/// `{id, url}` of a newly created widget.
fn created<E: WidgetEntity>(entity: &E) -> Response {
    ok(serde_json::json!({ "id": entity.id(), "url": entity.url() }))
}

fn deleted() -> Response {
    ok(serde_json::json!({ "deleted": true }))
}

fn unknown_action() -> ApiError {
    ApiError::validation("unknown action")
}

fn owned(params: &Params, name: &str) -> Option<String> {
    params.get(name).map(str::to_string)
}

/// Title and webhook changes. A present but blank value clears the field.
fn settings_update(params: &Params) -> SettingsUpdate {
    SettingsUpdate {
        title: params.raw("title").map(str::to_string),
        webhook_url: params.raw("webhookUrl").map(str::to_string),
    }
}
