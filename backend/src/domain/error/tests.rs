//! Tests for error construction, trace capture, and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no session"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("denied"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("already finalised"), ErrorCode::Conflict)]
#[case(Error::payload_too_large("too big"), ErrorCode::PayloadTooLarge)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_camel_case_and_omits_empty_fields() {
    let value = serde_json::to_value(Error::conflict("taken")).expect("serialise error");
    assert_eq!(value, json!({ "code": "conflict", "message": "taken" }));
}

#[rstest]
fn deserialises_snake_case_trace_alias(expected_trace_id: String) {
    let payload = json!({
        "code": "payload_too_large",
        "message": "too big",
        "trace_id": expected_trace_id,
        "details": { "limit": 16 }
    });
    let error: Error = serde_json::from_value(payload).expect("deserialise error");
    assert_eq!(error.code(), ErrorCode::PayloadTooLarge);
    assert_eq!(error.trace_id(), Some(TRACE_ID));
    assert_eq!(error.details(), Some(&json!({ "limit": 16 })));
}

#[rstest]
fn display_uses_message() {
    assert_eq!(Error::forbidden("nope").to_string(), "nope");
}
