//! Reqwest-backed report drafter calling an OpenAI-compatible chat endpoint.
//!
//! This adapter owns transport details only: request serialisation, timeout and
//! HTTP error mapping, and decoding the first choice into a draft.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::dto::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
    MessageContent,
};
use crate::domain::ports::{DraftRequest, ReportDrafter, ReportDrafterError};
use crate::domain::{DRAFTING_SYSTEM_PROMPT, ReportDraft, drafting_user_prompt};

/// Default model used for drafting.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.3;

/// Connection settings for [`OpenAiReportDrafter`].
#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: Zeroizing<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiSettings {
    /// Settings for `api_key` with the default model, endpoint, and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Zeroizing::new(api_key.into()),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Failures constructing the drafter.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiBuildError {
    #[error("invalid OpenAI base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Drafter that POSTs to `{base_url}/chat/completions`.
pub struct OpenAiReportDrafter {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    model: String,
}

impl OpenAiReportDrafter {
    /// Build a drafter with a reqwest client bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse or the client cannot
    /// be constructed.
    pub fn new(settings: OpenAiSettings) -> Result<Self, OpenAiBuildError> {
        let endpoint = completions_endpoint(&settings.base_url)?;
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key,
            model: settings.model,
        })
    }
}

fn completions_endpoint(base_url: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/chat/completions",
        base_url.trim().trim_end_matches('/')
    ))
}

fn build_request<'a>(model: &'a str, request: &DraftRequest) -> ChatCompletionRequest<'a> {
    let image_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&request.image));
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(DRAFTING_SYSTEM_PROMPT),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: drafting_user_prompt(&request.clinical_notes),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ]),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

#[async_trait]
impl ReportDrafter for OpenAiReportDrafter {
    async fn draft(&self, request: &DraftRequest) -> Result<ReportDraft, ReportDrafterError> {
        info!(case_id = request.case_id, model = %self.model, "requesting report draft");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&build_request(&self.model, request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_status_error(status, body.as_ref());
            warn!(case_id = request.case_id, status = status.as_u16(), %error, "drafting failed");
            return Err(error);
        }

        let draft = parse_draft(body.as_ref())?;
        info!(case_id = request.case_id, "report draft received");
        Ok(draft)
    }
}

fn parse_draft(body: &[u8]) -> Result<ReportDraft, ReportDrafterError> {
    let raw: Value = serde_json::from_slice(body).map_err(|error| {
        ReportDrafterError::decode(format!("invalid completion JSON payload: {error}"))
    })?;
    let decoded: ChatCompletionResponse = serde_json::from_value(raw.clone()).map_err(|error| {
        ReportDrafterError::decode(format!("unexpected completion shape: {error}"))
    })?;
    if let Some(tokens) = decoded.usage.as_ref().and_then(|usage| usage.total_tokens) {
        info!(total_tokens = tokens, "drafting token usage");
    }
    let text = decoded.into_text().map_err(ReportDrafterError::decode)?;
    Ok(ReportDraft { raw, text })
}

fn map_transport_error(error: reqwest::Error) -> ReportDrafterError {
    if error.is_timeout() {
        ReportDrafterError::timeout(error.to_string())
    } else {
        ReportDrafterError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ReportDrafterError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => ReportDrafterError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ReportDrafterError::timeout(message)
        }
        _ => ReportDrafterError::api(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network drafting helpers.

    use super::*;
    use rstest::rstest;

    fn request(notes: &str) -> DraftRequest {
        DraftRequest {
            case_id: 4,
            image: vec![0xff, 0xd8, 0xff],
            clinical_notes: notes.to_owned(),
        }
    }

    #[rstest]
    #[case("https://api.openai.com/v1", "https://api.openai.com/v1/chat/completions")]
    #[case("https://proxy.internal/v1/", "https://proxy.internal/v1/chat/completions")]
    fn endpoint_appends_completions_path(#[case] base: &str, #[case] expected: &str) {
        let endpoint = completions_endpoint(base).expect("valid base url");
        assert_eq!(endpoint.as_str(), expected);
    }

    #[test]
    fn request_inlines_image_and_prompt() {
        let body = serde_json::to_value(build_request("gpt-4o", &request("")))
            .expect("request serialises");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], DRAFTING_SYSTEM_PROMPT);

        let parts = &body["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert!(
            parts[0]["text"]
                .as_str()
                .is_some_and(|text| text.contains("No clinical notes provided.")),
            "empty notes should use the placeholder"
        );
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,/9j/");
    }

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS)]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT)]
    #[case::unauthorised(StatusCode::UNAUTHORIZED)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_http_statuses_to_drafter_errors(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"error\":{\"message\":\"nope\"}}");
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                assert!(matches!(error, ReportDrafterError::RateLimited { .. }));
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                assert!(matches!(error, ReportDrafterError::Timeout { .. }));
            }
            _ => assert!(matches!(
                error,
                ReportDrafterError::Api { status: code, .. } if code == status.as_u16()
            )),
        }
    }

    #[test]
    fn body_preview_is_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn parses_first_choice_and_keeps_raw_response() {
        let body = br#"{
            "id": "chatcmpl-1",
            "choices": [{ "message": { "role": "assistant", "content": "1. FINDINGS:\nNormal." } }],
            "usage": { "total_tokens": 812 }
        }"#;

        let draft = parse_draft(body).expect("draft decodes");
        assert_eq!(draft.text, "1. FINDINGS:\nNormal.");
        assert_eq!(draft.raw["id"], "chatcmpl-1");
    }

    #[rstest]
    #[case::no_choices(br#"{"choices": []}"#.as_slice())]
    #[case::null_content(br#"{"choices": [{"message": {"content": null}}]}"#.as_slice())]
    #[case::not_json(b"<html>".as_slice())]
    fn rejects_unusable_responses(#[case] body: &[u8]) {
        let error = parse_draft(body).expect_err("decode should fail");
        assert!(matches!(error, ReportDrafterError::Decode { .. }));
    }
}
