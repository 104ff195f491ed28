//! Embedded Diesel migrations.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    #[error("migration task panicked: {message}")]
    Task { message: String },
}

/// Apply every pending migration and return the applied versions.
///
/// Runs on a blocking thread because Diesel's migration harness needs a
/// synchronous connection.
pub async fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || apply_blocking(&url))
        .await
        .map_err(|error| MigrationError::Task {
            message: error.to_string(),
        })?
}

fn apply_blocking(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|error| MigrationError::Connect {
            message: error.to_string(),
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| MigrationError::Apply {
            message: error.to_string(),
        })?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    info!(count = applied.len(), "applied pending migrations");
    Ok(applied)
}
