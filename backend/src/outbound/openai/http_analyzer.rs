//! Reqwest-backed analyzer for OpenAI-compatible chat completion endpoints.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and handing the returned text to
//! [`parse_analysis_report`]. It never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{ChatRequestDto, ChatResponseDto};
use crate::domain::ports::{FinancialAnalyzer, FinancialAnalyzerError};
use crate::domain::{AnalysisPrompt, AnalysisReport, parse_analysis_report};

/// Default provider base URL.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Analyzer that posts prompts to `<endpoint>/chat/completions`.
pub struct OpenAiChatAnalyzer {
    client: Client,
    completions_url: Url,
    api_key: Zeroizing<String>,
    model: String,
}

impl OpenAiChatAnalyzer {
    /// Build an analyzer with an explicit per-request timeout.
    ///
    /// ```rust,ignore
    /// let analyzer = OpenAiChatAnalyzer::new(endpoint, api_key, "gpt-4o-mini", timeout)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            completions_url: completions_url(endpoint),
            api_key: Zeroizing::new(api_key.into()),
            model: model.into(),
        })
    }

    /// Resolved completions URL.
    #[must_use]
    pub fn completions_url(&self) -> &Url {
        &self.completions_url
    }
}

#[async_trait]
impl FinancialAnalyzer for OpenAiChatAnalyzer {
    async fn analyze(
        &self,
        prompt: &AnalysisPrompt,
    ) -> Result<AnalysisReport, FinancialAnalyzerError> {
        let response = self
            .client
            .post(self.completions_url.clone())
            .bearer_auth(self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&ChatRequestDto::json_object(&self.model, prompt.as_str()))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let content = extract_content(body.as_ref())?;
        Ok(parse_analysis_report(&content)?)
    }
}

// `Url::join` drops the last path segment unless it ends with a slash.
fn completions_url(mut endpoint: Url) -> Url {
    if !endpoint.path().ends_with('/') {
        let path = format!("{}/", endpoint.path());
        endpoint.set_path(&path);
    }
    match endpoint.join("chat/completions") {
        Ok(url) => url,
        Err(_) => endpoint,
    }
}

fn extract_content(body: &[u8]) -> Result<String, FinancialAnalyzerError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        FinancialAnalyzerError::decode(format!("invalid completion payload: {error}"))
    })?;
    decoded
        .into_first_content()
        .ok_or_else(|| FinancialAnalyzerError::decode("completion contained no message content"))
}

fn map_transport_error(error: reqwest::Error) -> FinancialAnalyzerError {
    if error.is_timeout() {
        FinancialAnalyzerError::timeout(error.to_string())
    } else {
        FinancialAnalyzerError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> FinancialAnalyzerError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => FinancialAnalyzerError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            FinancialAnalyzerError::timeout(message)
        }
        _ if status.is_client_error() => FinancialAnalyzerError::rejected(message),
        _ => FinancialAnalyzerError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    preview
}
