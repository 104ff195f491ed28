//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    MockCaseCommand, MockCaseQuery, MockLoginService, MockRegistrationService, MockReportCommand,
    MockReportQuery, MockUserProfileQuery,
};
use crate::domain::{
    Case, CaseId, CaseStatus, EmailAddress, Error, Report, User, UserId, Username,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Path of the helper route that signs a user in without credentials.
pub const SEED_SESSION_PATH: &str = "/__test/session";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Port mocks with no expectations; tests configure the ones they exercise.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub registration: MockRegistrationService,
    pub profile: MockUserProfileQuery,
    pub cases: MockCaseCommand,
    pub cases_query: MockCaseQuery,
    pub reports: MockReportCommand,
    pub reports_query: MockReportQuery,
}

impl MockPorts {
    /// Wrap the mocks in handler state with the given upload limit.
    pub fn into_state(self, max_content_length: usize) -> HttpState {
        HttpState::with_max_content_length(
            HttpStatePorts {
                login: Arc::new(self.login),
                registration: Arc::new(self.registration),
                profile: Arc::new(self.profile),
                cases: Arc::new(self.cases),
                cases_query: Arc::new(self.cases_query),
                reports: Arc::new(self.reports),
                reports_query: Arc::new(self.reports_query),
            },
            max_content_length,
        )
    }
}

async fn seed_session(
    session: SessionContext,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(user_id.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the helper route used by [`session_cookie`].
pub fn seed_session_route(cfg: &mut web::ServiceConfig) {
    cfg.route(
        &format!("{SEED_SESSION_PATH}/{{user_id}}"),
        web::post().to(seed_session),
    );
}

/// Obtain a session cookie for `user_id` from an app that mounts
/// [`seed_session_route`].
pub async fn session_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    user_id: i32,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri(&format!("{SEED_SESSION_PATH}/{user_id}"))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "seeding the session failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Fixed timestamp shared by HTTP fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Persisted user with the given id.
pub fn sample_user(id: i32) -> User {
    User {
        id: UserId::new(id).expect("fixture user id"),
        username: Username::new("dr_smith").expect("fixture username"),
        email: EmailAddress::new("dr.smith@hospital.com").expect("fixture email"),
        created_at: fixture_timestamp(),
    }
}

/// Case owned by `owner` in the given status.
pub fn sample_case(id: i32, owner: i32, status: CaseStatus) -> Case {
    Case {
        id: CaseId::new(id).expect("fixture case id"),
        user_id: UserId::new(owner).expect("fixture owner id"),
        image_filename: "liver_scan.png".to_owned(),
        image_path: format!("{owner}/20240301_093000_000000_liver_scan.png"),
        clinical_notes: "Right upper quadrant pain for two weeks.".to_owned(),
        status,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// Unfinalised report holding an AI draft.
pub fn sample_report(case_id: i32) -> Report {
    Report {
        id: 11,
        case_id: CaseId::new(case_id).expect("fixture case id"),
        draft_json: None,
        draft_text: Some("**FINDINGS**\nLiver of normal size and echotexture.".to_owned()),
        final_text: None,
        is_finalized: false,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}
