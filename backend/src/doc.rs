//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, cases,
//!   reports, health)
//! - **Schemas**: error mirrors ([`ErrorSchema`], [`ErrorCodeSchema`]) and
//!   the response bodies built at the adapter edge
//! - **Security**: session cookie authentication scheme
//!
//! The document is served at `/api-docs/openapi.json` and exported via
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::reports::SaveReportBody;
use crate::inbound::http::schemas::{
    AuthResponse, CaseCreatedResponse, CaseDetailResponse, CaseSchema, CaseSummarySchema,
    DashboardResponse, EditableReportResponse, ErrorCodeSchema, ErrorSchema, NoticeResponse,
    ReportSavedResponse, ReportSchema, ServiceStatusSchema, UserSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DiagnoseAI API",
        description = "Ultrasound case intake, AI-drafted radiology reports, and reviewer sign-off."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::cases::create_case,
        crate::inbound::http::cases::dashboard,
        crate::inbound::http::cases::case_detail,
        crate::inbound::http::cases::case_image,
        crate::inbound::http::reports::editable_report,
        crate::inbound::http::reports::save_report,
        crate::inbound::http::reports::download_text,
        crate::inbound::http::reports::download_pdf,
        crate::inbound::http::health::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        AuthResponse,
        NoticeResponse,
        LoginRequest,
        RegisterRequest,
        CaseSchema,
        CaseSummarySchema,
        DashboardResponse,
        CaseDetailResponse,
        CaseCreatedResponse,
        ReportSchema,
        EditableReportResponse,
        SaveReportBody,
        ReportSavedResponse,
        ServiceStatusSchema
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "cases", description = "Ultrasound uploads and case review"),
        (name = "reports", description = "Report editing, finalisation, and export"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "traceId")]
    #[case("User", "createdAt")]
    #[case("Case", "statusLabel")]
    #[case("Report", "reportHtml")]
    fn registered_schemas_expose_camel_case_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/cases")]
    #[case("/api/v1/cases/{id}/report")]
    #[case("/api/v1/cases/{id}/report/download/pdf")]
    #[case("/")]
    fn document_lists_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
