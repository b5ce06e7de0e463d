//! Driven port for the external AI analyzer.
//!
//! Adapters own transport and decoding; the domain only sees a typed
//! [`AnalysisReport`] or a categorised failure. Adapters do not retry.

use async_trait::async_trait;

use crate::domain::{AnalysisPrompt, AnalysisReport, ReportDecodeError};

use super::define_port_error;

define_port_error! {
    /// Errors raised by analyzer adapters.
    pub enum FinancialAnalyzerError {
        /// Network or server failure.
        Transport { message: String } => "analyzer transport failed: {message}",
        /// The call did not finish in time.
        Timeout { message: String } => "analyzer timed out: {message}",
        /// The provider throttled the request.
        RateLimited { message: String } => "analyzer rate limited: {message}",
        /// The provider refused the request (credentials, quota, payload).
        Rejected { message: String } => "analyzer rejected request: {message}",
        /// The response did not match the expected report shape.
        Decode { message: String } => "analyzer response invalid: {message}",
        /// No analyzer is configured.
        Unavailable { message: String } => "analyzer unavailable: {message}",
    }
}

impl From<ReportDecodeError> for FinancialAnalyzerError {
    fn from(error: ReportDecodeError) -> Self {
        Self::decode(error.to_string())
    }
}

impl FinancialAnalyzerError {
    /// Short machine-friendly label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "decode",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

/// Port for turning a prompt into a structured financial report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinancialAnalyzer: Send + Sync {
    /// Run one analysis.
    async fn analyze(&self, prompt: &AnalysisPrompt)
    -> Result<AnalysisReport, FinancialAnalyzerError>;
}

/// Analyzer used when no provider credentials are configured. Every call
/// fails, so triggered analyses end in the `error` status.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledFinancialAnalyzer;

#[async_trait]
impl FinancialAnalyzer for DisabledFinancialAnalyzer {
    async fn analyze(
        &self,
        _prompt: &AnalysisPrompt,
    ) -> Result<AnalysisReport, FinancialAnalyzerError> {
        Err(FinancialAnalyzerError::unavailable(
            "no AI provider API key configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_analyzer_always_fails() {
        let error = DisabledFinancialAnalyzer
            .analyze(&AnalysisPrompt::for_content("x"))
            .await
            .expect_err("disabled analyzer fails");
        assert_eq!(error.kind(), "unavailable");
    }

    #[test]
    fn decode_failures_convert() {
        let error = FinancialAnalyzerError::from(ReportDecodeError::Malformed("eof".to_owned()));
        assert!(matches!(error, FinancialAnalyzerError::Decode { .. }));
        assert!(error.to_string().contains("eof"));
    }
}
