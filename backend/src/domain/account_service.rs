//! Account domain service.
//!
//! Implements the login, registration, and profile driving ports on top of
//! the [`UserRepository`] driven port.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    LoginService, RegistrationService, UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{Error, LoginCredentials, NewUser, PasswordHash, Registration, User, UserId};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
}

impl<U> AccountService<U> {
    /// Create a service over the given repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::conflict("Username already exists").with_details(json!({
                "field": "username",
                "code": "duplicate_username",
            }))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("Email already registered").with_details(json!({
                "field": "email",
                "code": "duplicate_email",
            }))
        }
    }
}

fn candidate(credentials: &LoginCredentials) -> Zeroizing<String> {
    Zeroizing::new(credentials.password().to_owned())
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
        else {
            if let Some(placeholder) = PasswordHash::placeholder() {
                let _ = placeholder.verify_off_thread(candidate(credentials)).await;
            }
            info!(username = credentials.username(), "login rejected: unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = stored
            .password_hash
            .verify_off_thread(candidate(credentials))
            .await
            .map_err(|err| {
                warn!(user_id = %stored.user.id, error = %err, "stored password hash unusable");
                Error::internal(format!("password verification failed: {err}"))
            })?;
        if !verified {
            info!(user_id = %stored.user.id, "login rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user)
    }
}

#[async_trait]
impl<U> RegistrationService for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            username,
            email,
            password,
        } = registration;
        let password_hash = password
            .hash_off_thread()
            .await
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        let user = self
            .users
            .create(&NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<U> UserProfileQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("Please log in to access this page."))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
