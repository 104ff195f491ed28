//! Wire types for the chat completions API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest<'a> {
    pub(super) model: &'a str,
    pub(super) messages: Vec<ChatMessage<'a>>,
    pub(super) max_tokens: u32,
    pub(super) temperature: f32,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessage<'a> {
    pub(super) role: &'static str,
    pub(super) content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(super) struct ImageUrl {
    pub(super) url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    #[serde(default)]
    pub(super) choices: Vec<ChoiceDto>,
    pub(super) usage: Option<UsageDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceDto {
    pub(super) message: ChoiceMessageDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceMessageDto {
    pub(super) content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UsageDto {
    pub(super) total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if it carries any text.
    pub(super) fn into_text(self) -> Result<String, String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_owned())?;
        choice
            .message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| "first choice carried no content".to_owned())
    }
}
