// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative sweep endpoint and the opportunistic sweep trigger.
//!
//! The endpoint requires `Authorization: Bearer <admin_token>`. When no
//! admin token is configured every request is rejected (fail-closed).

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use nostalgic_security::constant_time_eq;
use rand::Rng;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ok};
use crate::server::GatewayState;

/// Static credential guarding the admin routes.
#[derive(Clone, Default)]
pub struct AdminAuth {
    pub token: Option<String>,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

pub async fn admin_auth_middleware(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.admin.token.as_deref() else {
        error!("admin endpoint has no token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };
    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
            Ok(next.run(request).await)
        }
        _ => {
            warn!("admin request rejected");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// POST /api/admin/cleanup
pub async fn cleanup(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    let report = state.services.sweeper.run(state.ctx.now()).await?;
    Ok(ok(report))
}

/// Run the sweep in the background on a small fraction of requests.
pub async fn sweep_trigger(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let roll: f64 = rand::thread_rng().r#gen();
    if roll < state.sweep_probability {
        let sweeper = state.services.sweeper.clone();
        let now = state.ctx.now();
        debug!("opportunistic sweep triggered");
        tokio::spawn(async move {
            if let Err(e) = sweeper.run(now).await {
                warn!(error = %e, "opportunistic sweep failed");
            }
        });
    }
    next.run(request).await
}
