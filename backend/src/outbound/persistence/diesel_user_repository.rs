//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, NewUser, PasswordHash, User, UserCredentials, UserId, Username,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, violated_unique_constraint};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, user: &NewUser) -> UserPersistenceError {
    match violated_unique_constraint(&error) {
        Some(USERNAME_CONSTRAINT) => {
            UserPersistenceError::duplicate_username(user.username.as_ref())
        }
        Some(EMAIL_CONSTRAINT) => UserPersistenceError::duplicate_email(user.email.as_ref()),
        _ => map_error(error),
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |field: &'static str| {
        warn!(user_id = row.id, field, "stored user row failed validation");
        UserPersistenceError::query("stored user row is invalid")
    };
    Ok(User {
        id: UserId::new(row.id).map_err(|_| invalid("id"))?,
        username: Username::new(&row.username).map_err(|_| invalid("username"))?,
        email: EmailAddress::new(&row.email).map_err(|_| invalid("email"))?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;

        let new_row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_ref(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| map_insert_error(e, user))?;

        row_to_user(&row)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(|row| {
            Ok(UserCredentials {
                user: row_to_user(&row)?,
                password_hash: PasswordHash::from_stored(row.password_hash),
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(u64::try_from(total).unwrap_or_default())
    }
}
