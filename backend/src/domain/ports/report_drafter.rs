//! Driven port for drafting radiology reports with a hosted language model.
//!
//! The domain owns the request shape and the draft contract so case
//! orchestration stays provider-agnostic.

use async_trait::async_trait;

use crate::domain::ReportDraft;

use super::define_port_error;

/// Domain-owned drafting request passed to drafter adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
    /// Case being drafted, for log correlation.
    pub case_id: i32,
    /// Raw uploaded image bytes.
    pub image: Vec<u8>,
    /// Clinical notes supplied with the upload.
    pub clinical_notes: String,
}

define_port_error! {
    /// Errors surfaced while drafting a report.
    pub enum ReportDrafterError {
        /// No API key is configured.
        NotConfigured => "OpenAI API key not configured",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "drafting transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "drafting timed out: {message}",
        /// The provider rate-limited the request.
        RateLimited { message: String } => "drafting rate limited: {message}",
        /// The provider answered with a non-success status.
        Api { status: u16, message: String } => "drafting API returned {status}: {message}",
        /// The response carried no usable report.
        Decode { message: String } => "drafting response decode failed: {message}",
    }
}

/// Port for turning an image and clinical notes into a draft report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportDrafter: Send + Sync {
    /// Produce a draft for the request.
    async fn draft(&self, request: &DraftRequest) -> Result<ReportDraft, ReportDrafterError>;
}

/// Drafter used when no API key is configured. Every call fails with
/// [`ReportDrafterError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredReportDrafter;

#[async_trait]
impl ReportDrafter for UnconfiguredReportDrafter {
    async fn draft(&self, _request: &DraftRequest) -> Result<ReportDraft, ReportDrafterError> {
        Err(ReportDrafterError::not_configured())
    }
}
