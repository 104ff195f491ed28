//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"dr_smith","email":"dr.smith@hospital.com","password":"secret1","confirmPassword":"secret1"}
//! POST /api/v1/auth/login {"username":"admin","password":"admin123"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AuthResponse, ErrorSchema, NoticeResponse, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Registration request body for `POST /api/v1/auth/register`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.email,
            &value.password,
            &value.confirm_password,
        )
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => "username",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Create an account. The new user still has to log in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email already taken", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_validation_error)?;
    let user = state.registration.register(registration).await?;
    info!(user_id = %user.id, "account registered");
    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserSchema::from(&user),
        notice: "Registration successful".to_owned(),
    }))
}

/// Authenticate user and establish a session.
///
/// Uses the centralised `Error` type so clients get a consistent
/// error schema across all endpoints.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserSchema::from(&user),
        notice: "Login successful".to_owned(),
    }))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Logged out", body = NoticeResponse)),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().json(NoticeResponse {
        notice: "You have been logged out".to_owned(),
    })
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserSchema>> {
    let user_id = session.require_user_id()?;
    let user = state.profile.fetch_profile(user_id).await?;
    Ok(web::Json(UserSchema::from(&user)))
}

#[cfg(test)]
mod tests;
