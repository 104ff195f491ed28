//! Handler tests for the account endpoints.

use super::*;
use crate::domain::User;
use crate::domain::ports::MockLoginService;
use crate::inbound::http::test_utils::{
    MockPorts, sample_user, seed_session_route, session_cookie, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state(1024)))
        .wrap(test_session_middleware())
        .configure(seed_session_route)
        .service(
            web::scope("/api/v1")
                .service(register)
                .service(login)
                .service(logout)
                .service(current_user),
        )
}

fn login_ports(result: fn() -> Result<User, Error>) -> MockPorts {
    let mut login_port = MockLoginService::new();
    login_port
        .expect_authenticate()
        .times(1)
        .returning(move |_| result());
    MockPorts {
        login: login_port,
        ..MockPorts::default()
    }
}

#[actix_web::test]
async fn login_sets_session_and_returns_user() {
    let app = actix_test::init_service(test_app(login_ports(|| Ok(sample_user(5))))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "dr_smith", "password": "secret1"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie");
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["notice"], "Login successful");
    assert_eq!(body["user"]["id"], 5);
    assert_eq!(body["user"]["username"], "dr_smith");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(!cookie.value().is_empty());
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorised() {
    let app = actix_test::init_service(test_app(login_ports(|| {
        Err(Error::unauthorized("Invalid username or password"))
    })))
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "dr_smith", "password": "wrong"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response
            .response()
            .cookies()
            .all(|cookie| cookie.name() != "session")
    );
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Invalid username or password");
}

#[rstest]
#[case("   ", "secret1", "Username is required.", "username")]
#[case("dr_smith", "", "Password is required.", "password")]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] message: &str,
    #[case] field: &str,
) {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], message);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn register_creates_account() {
    let mut ports = MockPorts::default();
    ports
        .registration
        .expect_register()
        .withf(|registration| registration.username.as_ref() == "dr_smith")
        .times(1)
        .returning(|_| Ok(sample_user(9)));
    let app = actix_test::init_service(test_app(ports)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "dr_smith",
            "email": "Dr.Smith@Hospital.com",
            "password": "secret1",
            "confirmPassword": "secret1"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["notice"], "Registration successful");
    assert_eq!(body["user"]["email"], "dr.smith@hospital.com");
}

#[actix_web::test]
async fn register_reports_mismatched_confirmation() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "dr_smith",
            "email": "dr.smith@hospital.com",
            "password": "secret1",
            "confirmPassword": "secret2"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "confirmPassword");
}

#[actix_web::test]
async fn register_surfaces_duplicate_username() {
    let mut ports = MockPorts::default();
    ports
        .registration
        .expect_register()
        .returning(|_| Err(Error::conflict("Username already exists")));
    let app = actix_test::init_service(test_app(ports)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "admin",
            "email": "other@hospital.com",
            "password": "secret1",
            "confirmPassword": "secret1"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Username already exists");
}

#[actix_web::test]
async fn me_requires_a_session() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn me_returns_profile_for_session_user() {
    let mut ports = MockPorts::default();
    ports
        .profile
        .expect_fetch_profile()
        .withf(|id| id.get() == 5)
        .times(1)
        .returning(|_| Ok(sample_user(5)));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = session_cookie(&app, 5).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], 5);
}

#[actix_web::test]
async fn logout_purges_the_session() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let cookie = session_cookie(&app, 5).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let removal = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.value().to_owned());
    assert_eq!(removal.as_deref(), Some(""));
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["notice"], "You have been logged out");
}
