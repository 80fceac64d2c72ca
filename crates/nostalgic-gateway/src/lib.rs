// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Nostalgic widgets.
//!
//! One route per widget kind; the `action` query parameter selects the
//! operation. Every JSON response uses the envelope
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.

pub mod admin;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod render;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
