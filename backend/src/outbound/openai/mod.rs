//! AI provider outbound adapters.
//!
//! A thin HTTP implementation of the `FinancialAnalyzer` port for
//! OpenAI-compatible chat completion APIs.

mod dto;
mod http_analyzer;

pub use http_analyzer::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, OpenAiChatAnalyzer};
