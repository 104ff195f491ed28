//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("database exploded")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn invalid_request_case(expected_trace_id: String) -> Error {
    Error::invalid_request("Clinical notes are required.")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"field": "clinicalNotes"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("finalized"), StatusCode::CONFLICT)]
#[case(Error::payload_too_large("too big"), StatusCode::PAYLOAD_TOO_LARGE)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    #[from(internal_error_case)] internal_error: Error,
    expected_trace_id: String,
) {
    let redacted = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details(
    #[from(invalid_request_case)] invalid_request: Error,
    expected_trace_id: String,
) {
    let payload = assert_error_response(
        invalid_request,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "Clinical notes are required.");
    assert_eq!(payload.details(), Some(&json!({"field": "clinicalNotes"})));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::not_found("Case not found");

    let payload = assert_error_response(error, StatusCode::NOT_FOUND, None).await;
    assert_eq!(payload.code(), ErrorCode::NotFound);
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
#[case(Error::not_found("Case not found"))]
#[case(Error::internal("disk full"))]
fn error_responses_are_not_cached(#[case] error: Error) {
    let response = ResponseError::error_response(&error);
    let cache = response
        .headers()
        .get(actix_web::http::header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok());
    assert_eq!(cache, Some("no-store"));
}
