//! Port abstraction for report persistence.
//!
//! Report writes also move the owning case through its workflow, so adapters
//! must commit the report row and the case status together.
use async_trait::async_trait;

use crate::domain::{CaseId, Report, ReportDraft, ReportEditAction, ReportText};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by report repository adapters.
    pub enum ReportPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "report repository query failed: {message}",
        /// No report exists for the case.
        NotFound { case_id: i32 } => "no report for case {case_id}",
        /// The report is finalised and may no longer change.
        AlreadyFinalized { case_id: i32 } => "report for case {case_id} is finalized",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store an AI draft for a case and mark the case `draft_ready`.
    async fn attach_draft(
        &self,
        case_id: CaseId,
        draft: &ReportDraft,
    ) -> Result<Report, ReportPersistenceError>;

    /// Fetch the report for a case.
    async fn find_by_case(&self, case_id: CaseId) -> Result<Option<Report>, ReportPersistenceError>;

    /// Apply reviewer edits.
    ///
    /// `save_draft` stores the text and marks the case `draft_edited`;
    /// `finalize` also locks the report and marks the case `completed`.
    /// Fails with [`ReportPersistenceError::AlreadyFinalized`] when the report
    /// was locked before this call.
    async fn save_edit(
        &self,
        case_id: CaseId,
        text: &ReportText,
        action: ReportEditAction,
    ) -> Result<Report, ReportPersistenceError>;
}
