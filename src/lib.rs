pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::core::bootstrap::{self, SeedOutcome};
use crate::core::cache::Cache;
use crate::core::{config::Settings, redis::RedisHandle, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await.context("database is unreachable")?;
    db::run_migrations(&db_pool).await?;

    let redis = RedisHandle::new(settings.redis().redis_url());
    redis.connect().await.context("redis is unreachable")?;
    tracing::info!("Redis connected successfully");

    match bootstrap::seed_admin(&db_pool, settings.admin()).await? {
        SeedOutcome::Created => tracing::info!(email = %settings.admin().email, "Seeded admin account"),
        SeedOutcome::SkippedNoPassword | SeedOutcome::SkippedExistingUsers => {}
    }

    let cache: Arc<dyn Cache> = Arc::new(redis.clone());
    let state = AppState::new(settings, db_pool, cache);
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Examhall API listening"
    );

    let result = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await;

    redis.disconnect().await;
    tracing::info!("Redis disconnected");

    result?;

    Ok(())
}
