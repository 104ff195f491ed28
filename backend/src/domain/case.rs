//! Diagnostic case model: one uploaded ultrasound study with clinical notes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Minimum clinical notes length in characters.
pub const CLINICAL_NOTES_MIN: usize = 10;
/// Maximum clinical notes length in characters.
pub const CLINICAL_NOTES_MAX: usize = 2000;

/// Database-assigned case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct CaseId(i32);

/// Error returned for non-positive case identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("case id must be a positive integer")]
pub struct InvalidCaseId;

impl CaseId {
    /// Validate and construct a [`CaseId`].
    pub fn new(id: i32) -> Result<Self, InvalidCaseId> {
        if id <= 0 {
            return Err(InvalidCaseId);
        }
        Ok(Self(id))
    }

    /// Raw integer value used by persistence adapters.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CaseId> for i32 {
    fn from(value: CaseId) -> Self {
        value.0
    }
}

impl TryFrom<i32> for CaseId {
    type Error = InvalidCaseId;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Workflow state of a case.
///
/// ```text
/// uploaded ──draft ok──▶ draft_ready ──save──▶ draft_edited ──finalize──▶ completed
///     │                       └───────────────finalize─────────────────────▲
///     └──drafting failed──▶ ai_failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Image stored, AI draft pending.
    Uploaded,
    /// AI draft stored and awaiting review.
    DraftReady,
    /// A reviewer saved edits without finalising.
    DraftEdited,
    /// Report finalised.
    Completed,
    /// Drafting failed; the case needs manual review.
    AiFailed,
}

/// Error returned when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown case status: {0}")]
pub struct UnknownCaseStatus(pub String);

impl CaseStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::DraftReady => "draft_ready",
            Self::DraftEdited => "draft_edited",
            Self::Completed => "completed",
            Self::AiFailed => "ai_failed",
        }
    }

    /// Human-readable badge label shown on dashboards.
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::CaseStatus;
    ///
    /// assert_eq!(CaseStatus::Uploaded.label(), "Processing");
    /// assert_eq!(CaseStatus::AiFailed.label(), "AI Failed");
    /// ```
    pub fn label(self) -> &'static str {
        match self {
            Self::Uploaded => "Processing",
            Self::DraftReady => "Draft Ready",
            Self::DraftEdited => "Draft Edited",
            Self::Completed => "Completed",
            Self::AiFailed => "AI Failed",
        }
    }
}

/// Badge label for a raw stored status.
///
/// Unrecognised values are shown title-cased (`on_hold` becomes `On Hold`).
///
/// # Examples
/// ```
/// use diagnoseai::domain::status_label;
///
/// assert_eq!(status_label("draft_ready"), "Draft Ready");
/// assert_eq!(status_label("on_hold"), "On Hold");
/// ```
pub fn status_label(raw: &str) -> String {
    if let Ok(status) = raw.parse::<CaseStatus>() {
        return status.label().to_owned();
    }
    raw.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = UnknownCaseStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(Self::Uploaded),
            "draft_ready" => Ok(Self::DraftReady),
            "draft_edited" => Ok(Self::DraftEdited),
            "completed" => Ok(Self::Completed),
            "ai_failed" => Ok(Self::AiFailed),
            other => Err(UnknownCaseStatus(other.to_owned())),
        }
    }
}

/// Validation failures for case submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseValidationError {
    #[error("Please select an image file.")]
    MissingImage,
    #[error("Only image files are allowed (jpg, jpeg, png, gif, bmp, tiff).")]
    UnsupportedImageType,
    #[error("Clinical notes are required.")]
    MissingNotes,
    #[error("Clinical notes must be between {min} and {max} characters.")]
    NotesLength { min: usize, max: usize },
}

impl CaseValidationError {
    /// Form field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingImage | Self::UnsupportedImageType => "image",
            Self::MissingNotes | Self::NotesLength { .. } => "clinicalNotes",
        }
    }
}

/// Clinical notes accompanying an upload.
///
/// ## Invariants
/// - Trimmed; between [`CLINICAL_NOTES_MIN`] and [`CLINICAL_NOTES_MAX`]
///   characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClinicalNotes(String);

impl ClinicalNotes {
    /// Validate raw notes.
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::ClinicalNotes;
    ///
    /// assert!(ClinicalNotes::new("Right upper quadrant pain").is_ok());
    /// assert!(ClinicalNotes::new("short").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CaseValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CaseValidationError::MissingNotes);
        }
        let length = trimmed.chars().count();
        if !(CLINICAL_NOTES_MIN..=CLINICAL_NOTES_MAX).contains(&length) {
            return Err(CaseValidationError::NotesLength {
                min: CLINICAL_NOTES_MIN,
                max: CLINICAL_NOTES_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ClinicalNotes {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ClinicalNotes> for String {
    fn from(value: ClinicalNotes) -> Self {
        value.0
    }
}

impl TryFrom<String> for ClinicalNotes {
    type Error = CaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored case record.
///
/// `clinical_notes` is plain text; stored rows are not revalidated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub user_id: UserId,
    pub image_filename: String,
    pub image_path: String,
    pub clinical_notes: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a case. New cases always start as
/// [`CaseStatus::Uploaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCase {
    pub user_id: UserId,
    pub image_filename: String,
    pub image_path: String,
    pub clinical_notes: ClinicalNotes,
}

/// Case row joined with the state of its report, used by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOverview {
    pub case: Case,
    pub has_report: bool,
    pub report_finalized: bool,
}
