//! Wire types for the chat completions API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct ChatRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) messages: [ChatMessageDto<'a>; 1],
    pub(super) response_format: ResponseFormatDto,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessageDto<'a> {
    pub(super) role: &'static str,
    pub(super) content: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ResponseFormatDto {
    #[serde(rename = "type")]
    pub(super) kind: &'static str,
}

impl<'a> ChatRequestDto<'a> {
    /// Single user message asking for a JSON object reply.
    pub(super) fn json_object(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [ChatMessageDto {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormatDto {
                kind: "json_object",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponseDto {
    #[serde(default)]
    pub(super) choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceDto {
    pub(super) message: Option<ChoiceMessageDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceMessageDto {
    pub(super) content: Option<String>,
}

impl ChatResponseDto {
    /// Text of the first choice, if the provider returned one.
    pub(super) fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
    }
}
