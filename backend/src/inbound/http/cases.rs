//! Case API handlers.
//!
//! ```text
//! POST /api/v1/cases            multipart: image, clinical_notes
//! GET  /api/v1/dashboard
//! GET  /api/v1/cases/{id}
//! GET  /api/v1/cases/{id}/image
//! ```

use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::ports::CreateCaseRequest;
use crate::domain::{CaseId, CaseSubmission, CaseValidationError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::multipart::{CaseUploadForm, check_declared_length, read_case_upload};
use crate::inbound::http::schemas::{
    CaseCreatedResponse, CaseDetailResponse, DashboardResponse, ErrorSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Parse a path segment into a [`CaseId`]; malformed ids are treated as
/// missing cases.
pub(crate) fn parse_case_id(raw: i32) -> Result<CaseId, Error> {
    CaseId::new(raw).map_err(|_| Error::not_found("Case not found"))
}

fn map_case_validation_error(err: CaseValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

fn submission_from_form(form: CaseUploadForm) -> Result<CaseSubmission, Error> {
    let CaseUploadForm {
        filename,
        image,
        clinical_notes,
    } = form;
    CaseSubmission::try_from_parts(filename.as_deref(), image, clinical_notes.as_deref())
        .map_err(map_case_validation_error)
}

/// Upload an image with clinical notes and request an AI draft.
///
/// The case is created even when drafting fails; the `notice` tells the
/// client which outcome occurred.
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    request_body(content_type = "multipart/form-data", description = "`image` file and `clinical_notes` text"),
    responses(
        (status = 201, description = "Case created", body = CaseCreatedResponse),
        (status = 400, description = "Invalid upload", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 413, description = "Upload too large", body = ErrorSchema),
        (status = 503, description = "Storage or database unavailable", body = ErrorSchema)
    ),
    tags = ["cases"],
    operation_id = "createCase"
)]
#[post("/cases")]
pub async fn create_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    check_declared_length(&req, state.max_content_length)?;
    let form = read_case_upload(payload, state.max_content_length).await?;
    let submission = submission_from_form(form)?;

    let created = state
        .cases
        .create_case(CreateCaseRequest { owner, submission })
        .await?;
    info!(
        case_id = %created.case.id,
        user_id = %owner,
        status = %created.case.status,
        "case created"
    );
    Ok(HttpResponse::Created().json(CaseCreatedResponse::from(&created)))
}

/// The signed-in user's cases with completion counters.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["cases"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    let owner = session.require_user_id()?;
    let dashboard = state.cases_query.dashboard(owner).await?;
    Ok(web::Json(DashboardResponse::from(&dashboard)))
}

/// Case detail including the rendered report.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    params(("id" = i32, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Case detail", body = CaseDetailResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Case not found", body = ErrorSchema)
    ),
    tags = ["cases"],
    operation_id = "caseDetail"
)]
#[get("/cases/{id}")]
pub async fn case_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<CaseDetailResponse>> {
    let owner = session.require_user_id()?;
    let case_id = parse_case_id(path.into_inner())?;
    let detail = state.cases_query.case_detail(owner, case_id).await?;
    Ok(web::Json(CaseDetailResponse::from(&detail)))
}

/// Stored ultrasound image for a case.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/image",
    params(("id" = i32, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Case or image not found", body = ErrorSchema)
    ),
    tags = ["cases"],
    operation_id = "caseImage"
)]
#[get("/cases/{id}/image")]
pub async fn case_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let case_id = parse_case_id(path.into_inner())?;
    let image = state.cases_query.case_image(owner, case_id).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Inline,
        parameters: vec![DispositionParam::Filename(image.filename)],
    };
    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header(disposition)
        .insert_header((header::CACHE_CONTROL, "private, max-age=300"))
        .body(image.bytes))
}
