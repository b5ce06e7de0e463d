//! Typed decoding of analyzer JSON into an [`AnalysisReport`].
//!
//! The analyzer is instructed to answer with a single JSON object. Decoding is
//! strict about types: a wrongly typed field or an out-of-range score fails the
//! whole report. Unknown fields are ignored and list fields may be absent.

use serde::Deserialize;
use serde_json::Number;

use super::{AnalysisReport, FinancialMetrics, HealthScore};

/// Reasons an analyzer payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportDecodeError {
    /// The payload was not a JSON object of the expected shape.
    #[error("analysis payload is malformed: {0}")]
    Malformed(String),
    /// `healthScore` was not an integer in 0..=100.
    #[error("analysis payload has invalid healthScore: {0}")]
    InvalidHealthScore(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportDto {
    #[serde(default)]
    metrics: Option<FinancialMetrics>,
    health_score: Number,
    #[serde(default)]
    risks: Option<Vec<String>>,
    #[serde(default)]
    opportunities: Option<Vec<String>>,
    #[serde(default)]
    recommendations: Option<Vec<String>>,
    ai_narrative: String,
}

/// Decode analyzer output text into a report.
///
/// # Examples
/// ```
/// use finlens::domain::parse_analysis_report;
///
/// let report = parse_analysis_report(r#"{"healthScore": 72, "aiNarrative": "Stable."}"#)
///     .expect("valid payload");
/// assert_eq!(report.health_score.get(), 72);
/// assert!(report.risks.is_empty());
/// ```
pub fn parse_analysis_report(text: &str) -> Result<AnalysisReport, ReportDecodeError> {
    let dto: ReportDto = serde_json::from_str(text)
        .map_err(|error| ReportDecodeError::Malformed(error.to_string()))?;

    Ok(AnalysisReport {
        metrics: dto.metrics.unwrap_or_default(),
        health_score: decode_health_score(&dto.health_score)?,
        risks: dto.risks.unwrap_or_default(),
        opportunities: dto.opportunities.unwrap_or_default(),
        recommendations: dto.recommendations.unwrap_or_default(),
        narrative: dto.ai_narrative,
    })
}

// Models occasionally emit integral scores as `72.0`; accept those, reject
// fractional ones.
fn decode_health_score(raw: &Number) -> Result<HealthScore, ReportDecodeError> {
    let integral = match raw.as_i64() {
        Some(value) => Some(value),
        None => raw
            .as_f64()
            .filter(|value| value.is_finite() && value.fract() == 0.0)
            .filter(|value| (-1.0e15..=1.0e15).contains(value))
            .map(|value| value as i64),
    };
    let value = integral
        .ok_or_else(|| ReportDecodeError::InvalidHealthScore(format!("{raw} is not an integer")))?;
    HealthScore::new(value).map_err(|error| ReportDecodeError::InvalidHealthScore(error.to_string()))
}
