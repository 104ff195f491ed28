//! Domain errors rendered as JSON responses.
//!
//! Client errors keep their message and details. Internal errors are logged
//! with the original message and returned as a generic payload, so stack
//! traces and SQL never reach the browser. Error bodies are never cached.

use actix_web::http::header::{CACHE_CONTROL, HeaderValue};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_error(error: &Error) {
    let trace_id = error.trace_id().unwrap_or("-");
    match error.code() {
        ErrorCode::InternalError => {
            error!(trace_id, message = error.message(), "request failed");
        }
        ErrorCode::ServiceUnavailable => {
            warn!(trace_id, message = error.message(), "dependency unavailable");
        }
        code => debug!(trace_id, ?code, message = error.message(), "request rejected"),
    }
}

/// Payload sent to the client.
fn public_payload(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(INTERNAL_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_error(self);
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header((CACHE_CONTROL, HeaderValue::from_static("no-store")));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(public_payload(self))
    }
}

#[cfg(test)]
mod tests;
