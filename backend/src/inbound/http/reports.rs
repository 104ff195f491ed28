//! Report editing and export handlers.
//!
//! ```text
//! GET /api/v1/cases/{id}/report
//! PUT /api/v1/cases/{id}/report {"reportText":"...","action":"finalize"}
//! GET /api/v1/cases/{id}/report/download/text
//! GET /api/v1/cases/{id}/report/download/pdf
//! ```

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::{ExportFormat, SaveReportRequest};
use crate::domain::{Error, ReportEditAction, ReportText, ReportValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cases::parse_case_id;
use crate::inbound::http::schemas::{EditableReportResponse, ErrorSchema, ReportSavedResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `PUT /api/v1/cases/{id}/report`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveReportBody {
    pub report_text: String,
    /// `save_draft` (default) or `finalize`.
    #[schema(value_type = Option<String>, example = "finalize")]
    pub action: Option<ReportEditAction>,
}

fn map_report_validation_error(err: ReportValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": "reportText" }))
}

/// Load the text to edit: the saved final text, otherwise the AI draft.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/report",
    params(("id" = i32, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Editable report", body = EditableReportResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Case or report not found", body = ErrorSchema),
        (status = 409, description = "Report already finalized", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "editableReport"
)]
#[get("/cases/{id}/report")]
pub async fn editable_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<EditableReportResponse>> {
    let owner = session.require_user_id()?;
    let case_id = parse_case_id(path.into_inner())?;
    let editable = state.reports_query.editable_report(owner, case_id).await?;
    Ok(web::Json(EditableReportResponse::from(&editable)))
}

/// Save reviewer edits, optionally finalising the report.
#[utoipa::path(
    put,
    path = "/api/v1/cases/{id}/report",
    params(("id" = i32, Path, description = "Case identifier")),
    request_body = SaveReportBody,
    responses(
        (status = 200, description = "Report saved", body = ReportSavedResponse),
        (status = 400, description = "Invalid report text", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Case or report not found", body = ErrorSchema),
        (status = 409, description = "Report already finalized", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "saveReport"
)]
#[put("/cases/{id}/report")]
pub async fn save_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<SaveReportBody>,
) -> ApiResult<web::Json<ReportSavedResponse>> {
    let owner = session.require_user_id()?;
    let case_id = parse_case_id(path.into_inner())?;
    let SaveReportBody {
        report_text,
        action,
    } = payload.into_inner();
    let text = ReportText::new(report_text).map_err(map_report_validation_error)?;
    let action = action.unwrap_or(ReportEditAction::SaveDraft);

    let saved = state
        .reports
        .save_edit(SaveReportRequest {
            owner,
            case_id,
            text,
            action,
        })
        .await?;
    info!(case_id = %case_id, user_id = %owner, status = %saved.case_status, "report saved");
    Ok(web::Json(ReportSavedResponse::from(&saved)))
}

async fn export(
    state: &HttpState,
    owner: UserId,
    raw_id: i32,
    format: ExportFormat,
) -> ApiResult<HttpResponse> {
    let case_id = parse_case_id(raw_id)?;
    let export = state.reports_query.export(owner, case_id, format).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(export.filename)],
    };
    Ok(HttpResponse::Ok()
        .content_type(export.format.content_type())
        .insert_header(disposition)
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body(export.bytes))
}

/// Plain-text export, downloaded as `case_{id}_report.txt`.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/report/download/text",
    params(("id" = i32, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Text attachment", content_type = "text/plain"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Case or report not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "downloadReportText"
)]
#[get("/cases/{id}/report/download/text")]
pub async fn download_text(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    export(&state, owner, path.into_inner(), ExportFormat::Text).await
}

/// PDF export, downloaded as `case_{id}_report.pdf`.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/report/download/pdf",
    params(("id" = i32, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "PDF attachment", content_type = "application/pdf"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Case or report not found", body = ErrorSchema),
        (status = 500, description = "Rendering failed", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "downloadReportPdf"
)]
#[get("/cases/{id}/report/download/pdf")]
pub async fn download_pdf(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    export(&state, owner, path.into_inner(), ExportFormat::Pdf).await
}
