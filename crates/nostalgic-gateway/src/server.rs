// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router, middleware as axum_middleware};
use nostalgic_core::NostalgicError;
use nostalgic_services::{ServiceContext, Services};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::admin::{AdminAuth, admin_auth_middleware, cleanup, sweep_trigger};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub ctx: Arc<ServiceContext>,
    pub services: Services,
    /// Salt mixed into every visitor fingerprint.
    pub visitor_salt: Arc<str>,
    pub admin: AdminAuth,
    /// Chance per request of an opportunistic sweep.
    pub sweep_probability: f64,
}

impl GatewayState {
    pub fn new(ctx: Arc<ServiceContext>, visitor_salt: &str) -> Self {
        Self {
            services: Services::new(ctx.clone()),
            ctx,
            visitor_salt: Arc::from(visitor_salt),
            admin: AdminAuth::default(),
            sweep_probability: 0.0,
        }
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin = AdminAuth { token };
        self
    }

    pub fn with_sweep_probability(mut self, probability: f64) -> Self {
        self.sweep_probability = probability;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full router:
/// - GET|POST /api/{counter,like,ranking,bbs}?action=...
/// - POST /api/admin/cleanup (bearer admin token)
/// - GET /health
pub fn build_router(state: GatewayState) -> Router {
    let widget_routes = Router::new()
        .route(
            "/api/counter",
            get(handlers::counter::handle).post(handlers::counter::handle),
        )
        .route(
            "/api/like",
            get(handlers::like::handle).post(handlers::like::handle),
        )
        .route(
            "/api/ranking",
            get(handlers::ranking::handle).post(handlers::ranking::handle),
        )
        .route(
            "/api/bbs",
            get(handlers::bbs::handle).post(handlers::bbs::handle),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            sweep_trigger,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/cleanup", post(cleanup))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(widget_routes)
        .merge(admin_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Bind and serve until the process is stopped.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), NostalgicError> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| NostalgicError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| NostalgicError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
