//! Read-only database queries used by the `diagnoseai-doctor` binary.
//!
//! Statuses are returned as stored so the report can show values the domain
//! no longer recognises.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{cases, reports, users};

/// Failures raised while collecting diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticsError {
    #[error("database connection failed: {message}")]
    Connection { message: String },
    #[error("diagnostic query failed: {message}")]
    Query { message: String },
}

impl DiagnosticsError {
    fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Row counts for every application table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub users: i64,
    pub cases: i64,
    pub reports: i64,
}

/// Recently created case with its raw status and report state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentCase {
    pub id: i32,
    pub username: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// `None` when no report exists; otherwise whether it is finalised.
    pub report_finalized: Option<bool>,
}

/// Diagnostic queries over the connection pool.
#[derive(Clone)]
pub struct DatabaseDiagnostics {
    pool: DbPool,
}

fn map_error(error: diesel::result::Error) -> DiagnosticsError {
    map_diesel_error(error, DiagnosticsError::query, DiagnosticsError::connection)
}

impl DatabaseDiagnostics {
    /// Create diagnostics over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Confirm the database answers a trivial query.
    pub async fn ping(&self) -> Result<(), DiagnosticsError> {
        self.pool
            .ping()
            .await
            .map_err(|e| map_pool_error(e, DiagnosticsError::connection))
    }

    /// Count rows in each table.
    pub async fn table_counts(&self) -> Result<TableCounts, DiagnosticsError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, DiagnosticsError::connection))?;

        let users = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;
        let cases = cases::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;
        let reports = reports::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(TableCounts {
            users,
            cases,
            reports,
        })
    }

    /// The `limit` most recently created cases across all users.
    pub async fn recent_cases(&self, limit: i64) -> Result<Vec<RecentCase>, DiagnosticsError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, DiagnosticsError::connection))?;

        let rows: Vec<(i32, String, String, DateTime<Utc>, Option<bool>)> = cases::table
            .inner_join(users::table)
            .left_join(reports::table)
            .order((cases::created_at.desc(), cases::id.desc()))
            .limit(limit)
            .select((
                cases::id,
                users::username,
                cases::status,
                cases::created_at,
                reports::is_finalized.nullable(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows
            .into_iter()
            .map(
                |(id, username, status, created_at, report_finalized)| RecentCase {
                    id,
                    username,
                    status,
                    created_at,
                    report_finalized,
                },
            )
            .collect())
    }
}
