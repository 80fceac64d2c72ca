// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use nostalgic_core::{NostalgicError, Result};
use tracing::error;

use crate::ssrf::SsrfSafeResolver;

/// HTTP client for webhook delivery: TLS 1.2+, per-request timeout, and the
/// SSRF-filtering resolver.
pub fn build_webhook_client(
    timeout: Duration,
    allowed_private_ips: &[String],
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .dns_resolver(Arc::new(SsrfSafeResolver::new(allowed_private_ips)))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| {
            error!(error = %e, "failed to build webhook client");
            NostalgicError::Internal(format!("failed to build webhook client: {e}"))
        })
}
