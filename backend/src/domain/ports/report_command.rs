//! Driving port for reviewer edits.

use async_trait::async_trait;

use crate::domain::{CaseId, CaseStatus, Error, Report, ReportEditAction, ReportText, UserId};

/// Reviewer edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReportRequest {
    pub owner: UserId,
    pub case_id: CaseId,
    pub text: ReportText,
    pub action: ReportEditAction,
}

/// Result of a stored edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSaved {
    pub report: Report,
    pub case_status: CaseStatus,
    pub notice: &'static str,
}

/// Domain use-case port for editing reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportCommand: Send + Sync {
    /// Save or finalise reviewer edits.
    async fn save_edit(&self, request: SaveReportRequest) -> Result<ReportSaved, Error>;
}
