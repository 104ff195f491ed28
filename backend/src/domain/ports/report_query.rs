//! Driving port for reading and exporting reports.

use async_trait::async_trait;

use crate::domain::{Case, CaseId, Error, Report, UserId};

/// Report loaded for editing.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableReport {
    pub case: Case,
    pub report: Report,
    /// Edited text when present, else the AI draft.
    pub text: String,
}

/// Downloadable export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Pdf,
}

impl ExportFormat {
    /// File extension used in attachment names.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }

    /// Response content type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Rendered export ready to send as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportExport {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Domain use-case port for report reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportQuery: Send + Sync {
    /// Load a report that may still be edited.
    async fn editable_report(&self, owner: UserId, case_id: CaseId)
    -> Result<EditableReport, Error>;

    /// Render a report export.
    async fn export(
        &self,
        owner: UserId,
        case_id: CaseId,
        format: ExportFormat,
    ) -> Result<ReportExport, Error>;
}
