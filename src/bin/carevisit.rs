//! Caregiver visit scheduling service.
//!
//! Loads [`carevisit::config::AppConfig`], connects to `PostgreSQL` and
//! serves the JSON API until interrupted. Apply the SQL under `migrations/`
//! before the first start.

use std::sync::Arc;

use anyhow::Context;
use carevisit::{
    config::AppConfig,
    http,
    schedule::{adapters::postgres::PostgresScheduleRepository, services::ScheduleLifecycleService},
    telemetry,
    user::{adapters::postgres::PostgresUserDirectory, services::UserManagementService},
};
use diesel::{
    PgConnection,
    r2d2::{ConnectionManager, Pool},
};
use mockable::DefaultClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.log.filter)?;

    let pool = Pool::builder()
        .max_size(config.database.pool_size)
        .build(ConnectionManager::<PgConnection>::new(&config.database.url))
        .context("failed to build database pool")?;
    tracing::info!(pool_size = config.database.pool_size, "database pool ready");

    let directory = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let clock = Arc::new(DefaultClock);
    let schedules = ScheduleLifecycleService::new(
        Arc::new(PostgresScheduleRepository::new(pool, DefaultClock)),
        Arc::clone(&directory),
        Arc::clone(&clock),
    );
    let users = UserManagementService::new(directory, clock);
    let app = http::router(Arc::new(schedules), Arc::new(users));

    let address = config.http.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, "carevisit listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("carevisit stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
    }
}
