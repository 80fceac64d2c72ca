// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring for `nostalgic serve` and `nostalgic sweep`.

use std::sync::Arc;
use std::time::Duration;

use nostalgic_config::NostalgicConfig;
use nostalgic_config::model::DEFAULT_VISITOR_SALT;
use nostalgic_core::traits::NoopNotifier;
use nostalgic_core::{NostalgicError, WebhookNotifier};
use nostalgic_gateway::{GatewayState, ServerConfig, start_server};
use nostalgic_services::{
    Calendar, PatternFilter, ReqwestNotifier, ServiceContext, ServicePolicy, Services,
};
use nostalgic_storage::{Database, SqliteRepositories};
use tracing::{info, warn};

/// Open storage and assemble the service context from configuration.
async fn build_context(config: &NostalgicConfig) -> Result<Arc<ServiceContext>, NostalgicError> {
    let db = Arc::new(Database::from_config(&config.storage).await?);
    let repos = Arc::new(SqliteRepositories::new(db)).repositories();

    let notifier: Arc<dyn WebhookNotifier> = if config.webhook.enabled {
        Arc::new(ReqwestNotifier::new(
            Duration::from_secs(config.webhook.timeout_secs),
            &config.webhook.allowed_private_ips,
        )?)
    } else {
        info!("webhooks disabled");
        Arc::new(NoopNotifier)
    };

    let ctx = ServiceContext::new(repos)
        .with_notifier(notifier)
        .with_filter(Arc::new(PatternFilter::new(&config.bbs.banned_words)?))
        .with_calendar(Calendar::new(config.calendar.utc_offset_minutes)?)
        .with_policy(ServicePolicy::from_config(config));
    Ok(Arc::new(ctx))
}

pub async fn run_serve(config: NostalgicConfig) -> Result<(), NostalgicError> {
    init_tracing(&config.server.log_level);

    if config.security.visitor_salt == DEFAULT_VISITOR_SALT {
        warn!("security.visitor_salt is the built-in default; set a private value");
    }
    if config.security.admin_token.is_none() {
        info!("no admin token configured; /api/admin/cleanup is disabled");
    }

    let ctx = build_context(&config).await?;
    let state = GatewayState::new(ctx, &config.security.visitor_salt)
        .with_admin_token(config.security.admin_token.clone())
        .with_sweep_probability(config.sweep.trigger_probability);

    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server, state).await
}

pub async fn run_sweep(config: NostalgicConfig) -> Result<(), NostalgicError> {
    init_tracing(&config.server.log_level);

    let ctx = build_context(&config).await?;
    let services = Services::new(ctx.clone());
    let report = services.sweeper.run(ctx.now()).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nostalgic={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
