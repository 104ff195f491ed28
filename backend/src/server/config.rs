//! HTTP server configuration read from the environment.
//!
//! Every variable is read through [`mockable::Env`] so parsing is covered by
//! unit tests without touching the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;

use diagnoseai::inbound::http::session_config::{
    BuildMode, SessionConfigError, session_settings_from_env,
};
use diagnoseai::inbound::http::state::DEFAULT_MAX_CONTENT_LENGTH;
use diagnoseai::outbound::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiSettings};
use diagnoseai::outbound::persistence::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig};

const BIND_ADDR_ENV: &str = "BIND_ADDR";
const PORT_ENV: &str = "PORT";
const WORKERS_ENV: &str = "WORKERS";
const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const DATABASE_MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";
const UPLOAD_FOLDER_ENV: &str = "UPLOAD_FOLDER";
const MAX_CONTENT_LENGTH_ENV: &str = "MAX_CONTENT_LENGTH";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
const HOSPITAL_NAME_ENV: &str = "HOSPITAL_NAME";

const DEFAULT_PORT: u16 = 5003;
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_UPLOAD_FOLDER: &str = "static/uploads";
const DEFAULT_HOSPITAL_NAME: &str = "General Hospital";

/// Errors raised while reading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Release builds refuse to fall back to in-memory storage.
    #[error("DATABASE_URL must be set outside development")]
    DatabaseRequired,
    /// Session settings failed validation.
    #[error(transparent)]
    Session(#[from] SessionConfigError),
}

/// Everything the server needs to start.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) workers: usize,
    pub(crate) request_timeout: Duration,
    pub(crate) database: Option<PoolConfig>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) upload_folder: PathBuf,
    pub(crate) max_content_length: usize,
    pub(crate) openai: Option<OpenAiSettings>,
    pub(crate) hospital_name: String,
}

impl ServerConfig {
    /// Read and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse, when the
    /// session secret is unusable, or when a release build has no database.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let mode = BuildMode::from_env(env);
        let session = session_settings_from_env(env, mode)?;

        let database = match non_empty(env, DATABASE_URL_ENV) {
            Some(url) => {
                let max = parse_or(
                    env,
                    DATABASE_MAX_CONNECTIONS_ENV,
                    DEFAULT_MAX_CONNECTIONS,
                    "a positive integer",
                )?;
                Some(PoolConfig::new(url).with_max_size(max))
            }
            None if mode.is_debug() => {
                warn!("DATABASE_URL not set; using in-memory storage (dev only)");
                None
            }
            None => return Err(ConfigError::DatabaseRequired),
        };

        let openai = non_empty(env, OPENAI_API_KEY_ENV).map(|key| {
            let mut settings = OpenAiSettings::new(key);
            settings.model =
                non_empty(env, OPENAI_MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_owned());
            settings.base_url =
                non_empty(env, OPENAI_BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
            settings
        });

        let workers = parse_or(env, WORKERS_ENV, DEFAULT_WORKERS, "a positive integer")?;
        if workers == 0 {
            return Err(ConfigError::InvalidEnv {
                name: WORKERS_ENV,
                value: "0".to_owned(),
                expected: "a positive integer",
            });
        }

        Ok(Self {
            key: session.key,
            cookie_secure: session.cookie_secure,
            same_site: session.same_site,
            bind_addr: bind_addr_from_env(env)?,
            workers,
            request_timeout: Duration::from_secs(parse_or(
                env,
                REQUEST_TIMEOUT_ENV,
                DEFAULT_REQUEST_TIMEOUT_SECS,
                "a number of seconds",
            )?),
            database,
            db_pool: None,
            upload_folder: non_empty(env, UPLOAD_FOLDER_ENV)
                .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_FOLDER), PathBuf::from),
            max_content_length: parse_or(
                env,
                MAX_CONTENT_LENGTH_ENV,
                DEFAULT_MAX_CONTENT_LENGTH,
                "a size in bytes",
            )?,
            openai,
            hospital_name: non_empty(env, HOSPITAL_NAME_ENV)
                .unwrap_or_else(|| DEFAULT_HOSPITAL_NAME.to_owned()),
        })
    }

    /// Attach the connection pool built from [`Self::database`].
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Pool settings when PostgreSQL is configured.
    pub fn database(&self) -> Option<&PoolConfig> {
        self.database.as_ref()
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn non_empty<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_or<E: Env, T: FromStr>(
    env: &E,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match non_empty(env, name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
        None => Ok(default),
    }
}

/// `BIND_ADDR`, with `PORT` replacing the port when a platform assigns one.
fn bind_addr_from_env<E: Env>(env: &E) -> Result<SocketAddr, ConfigError> {
    let mut addr = parse_or(
        env,
        BIND_ADDR_ENV,
        SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        "host:port",
    )?;
    if let Some(port) = non_empty(env, PORT_ENV) {
        let port = port.parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
            name: PORT_ENV,
            value: port,
            expected: "a TCP port",
        })?;
        addr.set_port(port);
    }
    Ok(addr)
}
