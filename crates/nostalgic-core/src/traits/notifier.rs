// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound webhook contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON body POSTed to a widget's webhook URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Event name, e.g. `counter.increment`.
    pub event: String,
    pub timestamp: DateTime<Utc>,
    /// Public id of the widget that changed.
    pub service_id: String,
    /// Owner URL of the widget.
    pub url: String,
    pub data: serde_json::Value,
}

/// Fire-and-forget delivery.
///
/// Implementations must return immediately; delivery failures are logged and
/// never reported to the caller.
pub trait WebhookNotifier: Send + Sync {
    fn notify(&self, target: &str, payload: WebhookPayload);
}

/// Drops every payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl WebhookNotifier for NoopNotifier {
    fn notify(&self, _target: &str, _payload: WebhookPayload) {}
}
