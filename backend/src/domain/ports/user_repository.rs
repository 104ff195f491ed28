//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username already exists: {username}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return the stored user.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user together with their password hash for authentication.
    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Number of stored accounts.
    async fn count(&self) -> Result<u64, UserPersistenceError>;
}
