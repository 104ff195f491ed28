//! Apply database migrations and seed the first administrator account.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use diagnoseai::domain::ports::{RegistrationService, UserRepository};
use diagnoseai::domain::{AccountService, Registration};
use diagnoseai::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};

const ADMIN_USERNAME: &str = "admin";
const ADMIN_EMAIL: &str = "admin@hospital.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// `diagnoseai-migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "diagnoseai-migrate",
    about = "Apply pending migrations and seed an administrator on an empty database",
    version
)]
struct CliArgs {
    /// PostgreSQL connection URL.
    #[arg(long = "database-url", env = "DATABASE_URL", value_name = "url")]
    database_url: String,
    /// Password for the seeded `admin` account.
    #[arg(long = "admin-password", value_name = "password")]
    admin_password: Option<String>,
    /// Apply migrations without seeding.
    #[arg(long = "skip-seed")]
    skip_seed: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let applied = run_pending_migrations(&args.database_url)
        .await
        .wrap_err("apply migrations")?;
    if applied.is_empty() {
        info!("database schema is up to date");
    } else {
        for version in &applied {
            info!(%version, "applied migration");
        }
    }

    if args.skip_seed {
        return Ok(());
    }

    let pool = DbPool::new(PoolConfig::new(&args.database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;
    let users = Arc::new(DieselUserRepository::new(pool));
    let existing = users.count().await.wrap_err("count users")?;
    if existing > 0 {
        info!(users = existing, "accounts already exist; skipping admin seed");
        return Ok(());
    }

    let password = match args.admin_password {
        Some(password) => password,
        None => {
            warn!(
                username = ADMIN_USERNAME,
                "seeding admin with the default password; change it before going live"
            );
            DEFAULT_ADMIN_PASSWORD.to_owned()
        }
    };
    let registration =
        Registration::try_from_parts(ADMIN_USERNAME, ADMIN_EMAIL, &password, &password)
            .map_err(|e| eyre!("invalid admin account: {e}"))?;
    let admin = AccountService::new(users)
        .register(registration)
        .await
        .map_err(|e| eyre!("seed admin account: {}", e.message()))?;
    info!(user_id = %admin.id, username = %admin.username, "seeded admin account");
    Ok(())
}
