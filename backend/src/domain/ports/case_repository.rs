//! Port abstraction for diagnostic case persistence.
use async_trait::async_trait;

use crate::domain::{Case, CaseId, CaseOverview, CaseStatus, NewCase, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by case repository adapters.
    pub enum CasePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "case repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "case repository query failed: {message}",
        /// The case targeted by an update does not exist.
        NotFound { case_id: i32 } => "case {case_id} not found",
    }
}

/// Storage for cases.
///
/// Lookups that take a [`UserId`] only ever return that user's cases;
/// adapters never leak another user's rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Insert a case with status [`CaseStatus::Uploaded`].
    async fn create(&self, case: &NewCase) -> Result<Case, CasePersistenceError>;

    /// Fetch a case owned by `owner`.
    async fn find_owned(
        &self,
        owner: UserId,
        id: CaseId,
    ) -> Result<Option<Case>, CasePersistenceError>;

    /// List a user's cases, newest first, with their report state.
    async fn list_for_user(&self, owner: UserId)
    -> Result<Vec<CaseOverview>, CasePersistenceError>;

    /// Move a case to a new status and bump `updated_at`.
    async fn update_status(
        &self,
        id: CaseId,
        status: CaseStatus,
    ) -> Result<(), CasePersistenceError>;
}
