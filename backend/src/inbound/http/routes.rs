//! Route table for the versioned REST API.
//!
//! ```text
//! /api/v1/auth/{register,login,logout,me}
//! /api/v1/dashboard
//! /api/v1/cases[/{id}[/image|/report[/download/{text,pdf}]]]
//! ```
//!
//! The scope carries no middleware; the server wraps it with the session
//! layer so tests can substitute their own.

use actix_web::{Scope, web};

use super::auth::{current_user, login, logout, register};
use super::cases::{case_detail, case_image, create_case, dashboard};
use super::reports::{download_pdf, download_text, editable_report, save_report};

/// Prefix shared by every REST endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// All REST handlers mounted under [`API_PREFIX`].
pub fn api_scope() -> Scope {
    web::scope(API_PREFIX)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(dashboard)
        .service(create_case)
        .service(case_image)
        .service(editable_report)
        .service(save_report)
        .service(download_text)
        .service(download_pdf)
        .service(case_detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{MockPorts, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case("/api/v1/auth/me")]
    #[case("/api/v1/dashboard")]
    #[case("/api/v1/cases/1")]
    #[case("/api/v1/cases/1/image")]
    #[case("/api/v1/cases/1/report")]
    #[case("/api/v1/cases/1/report/download/text")]
    #[case("/api/v1/cases/1/report/download/pdf")]
    #[actix_web::test]
    async fn protected_routes_are_mounted_and_require_login(#[case] uri: &str) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(MockPorts::default().into_state(1024)))
                .service(api_scope().wrap(test_session_middleware())),
        )
        .await;

        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}
