// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget webhook delivery over reqwest.

use std::time::Duration;

use nostalgic_core::{Result, WebhookNotifier, WebhookPayload};
use nostalgic_security::build_webhook_client;
use tracing::{debug, warn};

/// Posts payloads as JSON from a spawned task; the caller never waits.
pub struct ReqwestNotifier {
    client: reqwest::Client,
}

impl ReqwestNotifier {
    pub fn new(timeout: Duration, allowed_private_ips: &[String]) -> Result<Self> {
        Ok(Self {
            client: build_webhook_client(timeout, allowed_private_ips)?,
        })
    }
}

impl WebhookNotifier for ReqwestNotifier {
    fn notify(&self, target: &str, payload: WebhookPayload) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(event = %payload.event, "no async runtime; webhook dropped");
            return;
        };
        let client = self.client.clone();
        let target = target.to_string();
        runtime.spawn(async move {
            match client.post(&target).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(event = %payload.event, widget_id = %payload.service_id, "webhook delivered");
                }
                Ok(response) => {
                    warn!(
                        event = %payload.event,
                        widget_id = %payload.service_id,
                        status = %response.status(),
                        "webhook rejected by receiver"
                    );
                }
                Err(e) => {
                    warn!(
                        event = %payload.event,
                        widget_id = %payload.service_id,
                        error = %e,
                        "webhook delivery failed"
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payload() -> WebhookPayload {
        WebhookPayload {
            event: "counter.increment".to_string(),
            timestamp: Utc::now(),
            service_id: "a-example-00000000".to_string(),
            url: "https://a.example".to_string(),
            data: serde_json::json!({ "total": 1 }),
        }
    }

    #[test]
    fn notify_outside_runtime_is_a_no_op() {
        let notifier = ReqwestNotifier::new(Duration::from_secs(1), &[]).unwrap();
        notifier.notify("https://hooks.example/x", payload());
    }

    #[tokio::test]
    async fn notify_to_private_target_does_not_block_or_panic() {
        let notifier = ReqwestNotifier::new(Duration::from_millis(200), &[]).unwrap();
        notifier.notify("http://localhost:9/hook", payload());
    }
}
