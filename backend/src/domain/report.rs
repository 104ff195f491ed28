//! Radiology report model: an AI draft plus the reviewer's edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CaseId;

/// Minimum report body length in characters.
pub const REPORT_TEXT_MIN: usize = 50;
/// Maximum report body length in characters.
pub const REPORT_TEXT_MAX: usize = 5000;

/// Stored report attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i32,
    pub case_id: CaseId,
    pub draft_json: Option<Value>,
    pub draft_text: Option<String>,
    pub final_text: Option<String>,
    pub is_finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Text a reviewer should see: the edited text when present, else the
    /// AI draft.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use diagnoseai::domain::{CaseId, Report};
    ///
    /// let now = Utc::now();
    /// let mut report = Report {
    ///     id: 1,
    ///     case_id: CaseId::new(1).unwrap(),
    ///     draft_json: None,
    ///     draft_text: Some("draft".into()),
    ///     final_text: None,
    ///     is_finalized: false,
    ///     created_at: now,
    ///     updated_at: now,
    /// };
    /// assert_eq!(report.current_text(), Some("draft"));
    /// report.final_text = Some("edited".into());
    /// assert_eq!(report.current_text(), Some("edited"));
    /// ```
    pub fn current_text(&self) -> Option<&str> {
        self.final_text
            .as_deref()
            .or(self.draft_text.as_deref())
            .filter(|text| !text.is_empty())
    }

    /// Export label describing the report's review state.
    pub fn state_label(&self) -> &'static str {
        if self.is_finalized {
            "Final"
        } else {
            "Draft - Requires Review"
        }
    }
}

/// AI-generated draft: the raw provider response plus its text content.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub raw: Value,
    pub text: String,
}

/// Validation failures for reviewer edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportValidationError {
    #[error("Report content is required.")]
    Missing,
    #[error("Report content must be between {min} and {max} characters.")]
    Length { min: usize, max: usize },
}

/// Reviewer-supplied report body.
///
/// ## Invariants
/// - Trimmed; between [`REPORT_TEXT_MIN`] and [`REPORT_TEXT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportText(String);

impl ReportText {
    /// Validate raw report text.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ReportValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ReportValidationError::Missing);
        }
        let length = trimmed.chars().count();
        if !(REPORT_TEXT_MIN..=REPORT_TEXT_MAX).contains(&length) {
            return Err(ReportValidationError::Length {
                min: REPORT_TEXT_MIN,
                max: REPORT_TEXT_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ReportText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// What the reviewer asked to do with their edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportEditAction {
    /// Keep the report editable.
    SaveDraft,
    /// Lock the report.
    Finalize,
}

impl ReportEditAction {
    /// Confirmation shown after the edit is stored.
    pub fn notice(self) -> &'static str {
        match self {
            Self::SaveDraft => "Draft report has been saved successfully.",
            Self::Finalize => "Report has been finalized successfully.",
        }
    }
}
