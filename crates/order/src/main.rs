use anyhow::{Context, Result};
use order::{config::Config, handler::AppRouter, state::AppState};
use shared::{
    config::{ConnectionManager, ConnectionPool},
    utils::{Telemetry, init_logger},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let is_dev = std::env::var("DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let is_enable_file = std::env::var("ENABLE_FILE_LOG")
        .map(|v| v == "true")
        .unwrap_or(false);

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::init("order-service", &config.otel_endpoint)
        .context("Failed to initialize telemetry")?;

    init_logger(
        telemetry.logger_provider(),
        "order-service",
        is_dev,
        is_enable_file,
    );

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to migrate database")?;
    }

    let state = AppState::new(db_pool, &config);

    info!("✅ Application setup completed successfully.");

    let served = AppRouter::serve(config.port, state).await;

    if let Err(e) = telemetry.shutdown() {
        error!("Failed to shutdown telemetry: {e}");
    }

    served.context("HTTP server failed")?;

    info!("✅ Order service shutdown complete.");
    Ok(())
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    info!("🗄️ Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("✅ Migrations completed");
    Ok(())
}
