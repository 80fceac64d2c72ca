// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook notifier that keeps what it is given.

use std::sync::Mutex;

use nostalgic_core::{WebhookNotifier, WebhookPayload};

/// Captures every `(target, payload)` pair passed to `notify`.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, WebhookPayload)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, WebhookPayload)> {
        self.sent.lock().unwrap().clone()
    }

    /// Event names in delivery order.
    pub fn events(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.event.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl WebhookNotifier for RecordingNotifier {
    fn notify(&self, target: &str, payload: WebhookPayload) {
        self.sent.lock().unwrap().push((target.to_string(), payload));
    }
}
