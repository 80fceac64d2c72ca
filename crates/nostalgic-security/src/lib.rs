// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential handling and outbound-request safety for the Nostalgic backend.
//!
//! Owner tokens are only ever stored as SHA-256 digests and compared in
//! constant time. Anonymous actors are identified by a salted digest of
//! their network fingerprint. Webhook targets are checked against private
//! address ranges both statically and at DNS resolution time.

pub mod client;
pub mod ssrf;
pub mod tokens;

pub use client::build_webhook_client;
pub use ssrf::{SsrfSafeResolver, validate_webhook_url};
pub use tokens::{
    constant_time_eq, hash_owner_token, validate_owner_token, verify_owner_token, visitor_hash,
};
