//! Driving port for case creation.

use async_trait::async_trait;

use crate::domain::{Case, CaseSubmission, Error, Report, UserId};

/// Request to open a case for an uploaded study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCaseRequest {
    pub owner: UserId,
    pub submission: CaseSubmission,
}

/// How the AI drafting step ended for a new case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    /// A draft was stored and the case is ready for review.
    Drafted,
    /// The drafter reported a failure; the case needs manual review.
    DrafterFailed,
    /// Something outside the drafter failed while drafting.
    Unexpected,
}

impl DraftOutcome {
    /// Notice shown to the submitter.
    pub fn notice(self) -> &'static str {
        match self {
            Self::Drafted => "Case created successfully! AI draft report has been generated.",
            Self::DrafterFailed => {
                "Case created but AI report generation failed. The case has been marked for manual review."
            }
            Self::Unexpected => {
                "Case created but AI report generation encountered an error. Please contact support."
            }
        }
    }
}

/// Result of [`CaseCommand::create_case`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaseCreated {
    pub case: Case,
    pub report: Option<Report>,
    pub outcome: DraftOutcome,
}

/// Domain use-case port for opening cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseCommand: Send + Sync {
    /// Store the image, create the case, and request an AI draft.
    ///
    /// Drafting failures do not fail the call; they are reported through
    /// [`CaseCreated::outcome`] and leave the case `ai_failed`.
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CaseCreated, Error>;
}
