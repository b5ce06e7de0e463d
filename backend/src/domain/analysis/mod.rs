//! Structured results of AI financial analysis.
//!
//! An [`Analysis`] is written once per successful analyzer run and never
//! mutated; consumers always read the newest one for a record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::RecordId;

mod prompt;
mod report;

pub use prompt::{AnalysisPrompt, MAX_PROMPT_CONTENT_CHARS};
pub use report::{ReportDecodeError, parse_analysis_report};

/// Store-assigned analysis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnalysisId(i64);

impl AnalysisId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Headline figures extracted from a document. Every figure is optional
/// because source documents rarely carry all of them.
///
/// The serialised form is stored verbatim as JSON, so field names follow the
/// analyzer's camelCase contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    /// Total revenue.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Total expenses.
    #[serde(default)]
    pub expenses: Option<f64>,
    /// Revenue minus expenses.
    #[serde(default)]
    pub net_profit: Option<f64>,
    /// Net cash flow.
    #[serde(default)]
    pub cash_flow: Option<f64>,
    /// Total assets.
    #[serde(default)]
    pub assets: Option<f64>,
    /// Total liabilities.
    #[serde(default)]
    pub liabilities: Option<f64>,
}

/// Validation failure for [`HealthScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("health score must be between 0 and 100, got {0}")]
pub struct HealthScoreOutOfRange(pub i64);

/// Overall financial health on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HealthScore(u8);

impl HealthScore {
    /// Highest possible score.
    pub const MAX: u8 = 100;

    /// Validate a raw score.
    ///
    /// # Examples
    /// ```
    /// use finlens::domain::HealthScore;
    ///
    /// assert_eq!(HealthScore::new(72).map(HealthScore::get), Ok(72));
    /// assert!(HealthScore::new(101).is_err());
    /// ```
    pub fn new(raw: i64) -> Result<Self, HealthScoreOutOfRange> {
        u8::try_from(raw)
            .ok()
            .filter(|score| *score <= Self::MAX)
            .map(Self)
            .ok_or(HealthScoreOutOfRange(raw))
    }

    /// Raw score value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Decoded analyzer output.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Extracted figures.
    pub metrics: FinancialMetrics,
    /// Overall health score.
    pub health_score: HealthScore,
    /// Identified risks, in analyzer order.
    pub risks: Vec<String>,
    /// Identified opportunities, in analyzer order.
    pub opportunities: Vec<String>,
    /// Suggested actions, in analyzer order.
    pub recommendations: Vec<String>,
    /// Markdown narrative summary.
    pub narrative: String,
}

/// Values required to persist an analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    /// Record the analysis belongs to.
    pub record_id: RecordId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Analyzer output.
    pub report: AnalysisReport,
}

impl NewAnalysis {
    /// Materialise the analysis once the store has assigned an id.
    #[must_use]
    pub fn into_analysis(self, id: AnalysisId) -> Analysis {
        Analysis {
            id,
            record_id: self.record_id,
            created_at: self.created_at,
            report: self.report,
        }
    }
}

/// A stored analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Store-assigned identifier.
    pub id: AnalysisId,
    /// Record the analysis belongs to.
    pub record_id: RecordId,
    /// Creation timestamp; never changes.
    pub created_at: DateTime<Utc>,
    /// Analyzer output.
    pub report: AnalysisReport,
}

impl Analysis {
    /// Ordering key used to pick the latest analysis for a record.
    #[must_use]
    pub fn recency_key(&self) -> (DateTime<Utc>, AnalysisId) {
        (self.created_at, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, true)]
    #[case(72, true)]
    #[case(100, true)]
    #[case(101, false)]
    #[case(-1, false)]
    #[case(300, false)]
    fn health_score_bounds(#[case] raw: i64, #[case] valid: bool) {
        assert_eq!(HealthScore::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn metrics_serialise_camel_case() {
        let metrics = FinancialMetrics {
            net_profit: Some(12.5),
            cash_flow: Some(-3.0),
            ..FinancialMetrics::default()
        };
        let value = serde_json::to_value(metrics).expect("metrics serialise");
        assert_eq!(value["netProfit"], 12.5);
        assert_eq!(value["cashFlow"], -3.0);
        assert!(value["revenue"].is_null());
    }
}
