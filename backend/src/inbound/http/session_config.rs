//! Session configuration parsing and validation.
//!
//! This module centralises the environment-driven session settings so they are
//! validated consistently and can be tested in isolation.

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

pub(crate) const SECRET_KEY_ENV: &str = "SECRET_KEY";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const APP_ENV: &str = "APP_ENV";
const LEGACY_APP_ENV: &str = "FLASK_ENV";
/// Minimum secret length accepted by the cookie key derivation.
pub const SECRET_KEY_MIN_LEN: usize = 32;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require a real secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use diagnoseai::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Build mode, promoted to release when `APP_ENV` (or `FLASK_ENV`) is
    /// `production`.
    #[must_use]
    pub fn from_env<E: Env>(env: &E) -> Self {
        let production = [APP_ENV, LEGACY_APP_ENV]
            .into_iter()
            .filter_map(|name| env.string(name))
            .any(|value| value.trim().eq_ignore_ascii_case("production"));
        if production {
            Self::Release
        } else {
            Self::from_debug_assertions()
        }
    }

    /// Whether this is a development build.
    pub fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session settings derived from configuration toggles.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The secret is shorter than [`SECRET_KEY_MIN_LEN`] bytes.
    #[error("SECRET_KEY too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use diagnoseai::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SECRET_KEY" => Some("a".repeat(48)),
///     "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let key = session_key_from_env(env, mode)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn cookie_secure_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SessionConfigError> {
    let default = !mode.is_debug();
    match env.string(COOKIE_SECURE_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None if mode.is_debug() => {
                warn!(value = %value, "invalid SESSION_COOKIE_SECURE; using default");
                Ok(default)
            }
            None => Err(SessionConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                value,
                expected: BOOL_EXPECTED,
            }),
        },
        None => Ok(default),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return Ok(SameSite::Lax);
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SESSION_SAMESITE=None with insecure cookies; browsers may reject them");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid SESSION_SAMESITE, using Lax");
            Ok(SameSite::Lax)
        }
        _ => Err(SessionConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let secret = env.string(SECRET_KEY_ENV).map(Zeroizing::new);
    match secret {
        Some(secret) if secret.len() >= SECRET_KEY_MIN_LEN => Ok(Key::derive_from(secret.as_bytes())),
        Some(secret) if !mode.is_debug() => Err(SessionConfigError::SecretTooShort {
            length: secret.len(),
            min_len: SECRET_KEY_MIN_LEN,
        }),
        None if !mode.is_debug() => Err(SessionConfigError::MissingEnv {
            name: SECRET_KEY_ENV,
        }),
        _ => {
            warn!("SECRET_KEY missing or short; using temporary session key (dev only)");
            Ok(Key::generate())
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
