//! OpenAPI schemas and JSON response bodies.
//!
//! Domain types stay free of `ToSchema`. Error payloads get documentation-only
//! mirrors registered under the domain names, while the response bodies below
//! are built from domain values at the adapter edge so the wire shape is
//! owned by the HTTP layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{CaseCreated, CaseDetail, Dashboard, EditableReport, ReportSaved};
use crate::domain::{Case, CaseOverview, Report, User, markdown_to_html};

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the resource state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The upload exceeds the configured size limit.
    #[schema(rename = "payload_too_large")]
    PayloadTooLarge,
    /// A dependency is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Clinical notes are required.")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details, such as the offending form field.
    details: Option<serde_json::Value>,
}

/// Body of `GET /`, polled by the container health check.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatusSchema {
    /// Application name.
    #[schema(example = "DiagnoseAI")]
    pub name: String,
    /// Hospital the deployment serves.
    #[schema(example = "General Hospital")]
    pub hospital: String,
    /// Always `ok` once the server is bound.
    #[schema(example = "ok")]
    pub status: String,
}

/// Account as exposed to clients. Password hashes never appear here.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = User)]
pub struct UserSchema {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "dr_smith")]
    pub username: String,
    #[schema(example = "dr.smith@hospital.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSchema {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.get(),
            username: user.username.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            created_at: user.created_at,
        }
    }
}

/// Successful authentication or registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserSchema,
    #[schema(example = "Login successful")]
    pub notice: String,
}

/// Confirmation message without further payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeResponse {
    #[schema(example = "You have been logged out")]
    pub notice: String,
}

/// Case metadata with its workflow status and badge label.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = Case)]
pub struct CaseSchema {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "liver_scan.jpg")]
    pub image_filename: String,
    pub clinical_notes: String,
    #[schema(example = "draft_ready")]
    pub status: String,
    #[schema(example = "Draft Ready")]
    pub status_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Case> for CaseSchema {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id.get(),
            image_filename: case.image_filename.clone(),
            clinical_notes: case.clinical_notes.clone(),
            status: case.status.as_str().to_owned(),
            status_label: case.status.label().to_owned(),
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }
}

/// Report content. `reportText` is the final text when present, otherwise
/// the draft; `reportHtml` is the same text rendered for display.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = Report)]
pub struct ReportSchema {
    pub id: i32,
    pub case_id: i32,
    pub draft_text: Option<String>,
    pub final_text: Option<String>,
    pub report_text: Option<String>,
    pub report_html: Option<String>,
    pub is_finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Report> for ReportSchema {
    fn from(report: &Report) -> Self {
        let report_text = report.current_text().map(str::to_owned);
        Self {
            id: report.id,
            case_id: report.case_id.get(),
            draft_text: report.draft_text.clone(),
            final_text: report.final_text.clone(),
            report_html: report_text.as_deref().map(markdown_to_html),
            report_text,
            is_finalized: report.is_finalized,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// Dashboard row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummarySchema {
    #[serde(flatten)]
    pub case: CaseSchema,
    pub has_report: bool,
    pub report_finalized: bool,
}

impl From<&CaseOverview> for CaseSummarySchema {
    fn from(overview: &CaseOverview) -> Self {
        Self {
            case: CaseSchema::from(&overview.case),
            has_report: overview.has_report,
            report_finalized: overview.report_finalized,
        }
    }
}

/// The signed-in user's cases, newest first, with counters.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub cases: Vec<CaseSummarySchema>,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl From<&Dashboard> for DashboardResponse {
    fn from(dashboard: &Dashboard) -> Self {
        Self {
            cases: dashboard.cases.iter().map(CaseSummarySchema::from).collect(),
            total: dashboard.total,
            completed: dashboard.completed,
            pending: dashboard.pending,
        }
    }
}

/// A case with its report, if one was drafted.
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseDetailResponse {
    pub case: CaseSchema,
    pub report: Option<ReportSchema>,
}

impl From<&CaseDetail> for CaseDetailResponse {
    fn from(detail: &CaseDetail) -> Self {
        Self {
            case: CaseSchema::from(&detail.case),
            report: detail.report.as_ref().map(ReportSchema::from),
        }
    }
}

/// Newly created case plus the drafting outcome notice.
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseCreatedResponse {
    pub case: CaseSchema,
    pub report: Option<ReportSchema>,
    #[schema(example = "Case created successfully! AI draft report has been generated.")]
    pub notice: String,
}

impl From<&CaseCreated> for CaseCreatedResponse {
    fn from(created: &CaseCreated) -> Self {
        Self {
            case: CaseSchema::from(&created.case),
            report: created.report.as_ref().map(ReportSchema::from),
            notice: created.outcome.notice().to_owned(),
        }
    }
}

/// Text loaded into the report editor.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditableReportResponse {
    pub case: CaseSchema,
    pub report_id: i32,
    pub report_text: String,
}

impl From<&EditableReport> for EditableReportResponse {
    fn from(editable: &EditableReport) -> Self {
        Self {
            case: CaseSchema::from(&editable.case),
            report_id: editable.report.id,
            report_text: editable.text.clone(),
        }
    }
}

/// Result of saving or finalising a report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSavedResponse {
    pub report: ReportSchema,
    #[schema(example = "completed")]
    pub case_status: String,
    #[schema(example = "Completed")]
    pub status_label: String,
    #[schema(example = "Report has been finalized successfully.")]
    pub notice: String,
}

impl From<&ReportSaved> for ReportSavedResponse {
    fn from(saved: &ReportSaved) -> Self {
        Self {
            report: ReportSchema::from(&saved.report),
            case_status: saved.case_status.as_str().to_owned(),
            status_label: saved.case_status.label().to_owned(),
            notice: saved.notice.to_owned(),
        }
    }
}
