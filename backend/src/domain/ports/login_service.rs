//! Driving ports for account use-cases: login and registration.
//!
//! Inbound adapters call these to authenticate or enrol users without knowing
//! the backing infrastructure, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Domain use-case port for self-service account creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account for a validated registration.
    async fn register(&self, registration: Registration) -> Result<User, Error>;
}
