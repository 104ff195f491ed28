//! Health endpoints: the root status document plus liveness and readiness
//! probes for orchestration and load balancers.
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

use super::schemas::ServiceStatusSchema;

/// Readiness flag and hospital identity shared by the health endpoints.
pub struct HealthState {
    ready: AtomicBool,
    hospital_name: String,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new("General Hospital")
    }
}

impl HealthState {
    /// Create a health state that reports not ready until the listener binds.
    pub fn new(hospital_name: impl Into<String>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            hospital_name: hospital_name.into(),
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Service status document, also used by the container health check.
#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Service is running", body = ServiceStatusSchema)
    )
)]
#[get("/")]
pub async fn status(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ServiceStatusSchema {
            name: "DiagnoseAI".to_owned(),
            hospital: state.hospital_name.clone(),
            status: "ok".to_owned(),
        })
}

/// Readiness probe. Return 200 when dependencies are initialised and the server can handle traffic; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. Answers 200 whenever a worker can serve a request.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive")
    )
)]
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    HealthState::probe_response(true)
}
