//! Backend entry-point: loads configuration, prepares storage, and serves
//! the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use diagnoseai::inbound::http::health::HealthState;
use diagnoseai::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env(&DefaultEnv::new()).map_err(std::io::Error::other)?;

    let config = match config.database().cloned() {
        Some(pool_config) => {
            let applied = run_pending_migrations(pool_config.database_url())
                .await
                .map_err(|e| std::io::Error::other(format!("database migrations failed: {e}")))?;
            if !applied.is_empty() {
                info!(count = applied.len(), migrations = ?applied, "applied migrations");
            }
            let pool = DbPool::new(pool_config)
                .await
                .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
            config.with_db_pool(pool)
        }
        None => config,
    };

    let health_state = web::Data::new(HealthState::new(config.hospital_name.clone()));
    let bind_addr = config.bind_addr();
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "DiagnoseAI listening");
    server.await
}
