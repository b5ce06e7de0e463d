//! Financial record and analysis DTOs.
//!
//! Timestamps are RFC 3339 strings; every body is camelCase.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AnalysisAccepted;
use crate::domain::{Analysis, FinancialMetrics, Record, RecordWithAnalysis};

/// Message returned when an analysis is accepted.
pub const ANALYSIS_STARTED_MESSAGE: &str = "Analysis started";

/// A stored financial document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    #[schema(example = 42)]
    pub id: i64,
    /// Owner of the record.
    pub user_id: String,
    #[schema(example = "q1.csv")]
    pub file_name: String,
    #[schema(example = "text/csv")]
    pub file_type: String,
    #[schema(example = "2026-03-01T09:30:00+00:00")]
    pub upload_date: String,
    #[schema(example = "pending")]
    pub status: String,
    /// Extracted text of the upload.
    pub content: Option<String>,
    pub file_url: Option<String>,
}

/// Structured metrics extracted by the analyzer. Absent values are `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub revenue: Option<f64>,
    pub expenses: Option<f64>,
    pub net_profit: Option<f64>,
    pub cash_flow: Option<f64>,
    pub assets: Option<f64>,
    pub liabilities: Option<f64>,
}

/// Result of analysing a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub id: i64,
    pub record_id: i64,
    pub created_at: String,
    pub metrics: MetricsResponse,
    #[schema(minimum = 0, maximum = 100, example = 72)]
    pub health_score: u8,
    #[schema(max_items = 100)]
    pub risks: Vec<String>,
    #[schema(max_items = 100)]
    pub opportunities: Vec<String>,
    #[schema(max_items = 100)]
    pub recommendations: Vec<String>,
    /// Markdown summary.
    pub ai_narrative: String,
}

/// A record listed together with its latest analysis, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordWithAnalysisResponse {
    #[serde(flatten)]
    pub record: RecordResponse,
    pub analysis: Option<AnalysisResponse>,
}

/// Acknowledgement body for `POST /api/files/{id}/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAcceptedResponse {
    #[schema(example = "Analysis started")]
    pub message: String,
    pub record_id: i64,
    #[schema(example = "processing")]
    pub status: String,
}

/// Multipart upload form; documents the `file` part for OpenAPI.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UploadForm {
    /// csv, xlsx, xls, pdf, txt or json document.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id.get(),
            user_id: record.owner.to_string(),
            file_name: record.file_name,
            file_type: record.file_type,
            upload_date: record.upload_date.to_rfc3339(),
            status: record.status.as_str().to_owned(),
            content: record.content,
            file_url: record.file_url,
        }
    }
}

impl From<FinancialMetrics> for MetricsResponse {
    fn from(metrics: FinancialMetrics) -> Self {
        Self {
            revenue: metrics.revenue,
            expenses: metrics.expenses,
            net_profit: metrics.net_profit,
            cash_flow: metrics.cash_flow,
            assets: metrics.assets,
            liabilities: metrics.liabilities,
        }
    }
}

impl From<Analysis> for AnalysisResponse {
    fn from(analysis: Analysis) -> Self {
        let report = analysis.report;
        Self {
            id: analysis.id.get(),
            record_id: analysis.record_id.get(),
            created_at: analysis.created_at.to_rfc3339(),
            metrics: report.metrics.into(),
            health_score: report.health_score.get(),
            risks: report.risks,
            opportunities: report.opportunities,
            recommendations: report.recommendations,
            ai_narrative: report.narrative,
        }
    }
}

impl From<RecordWithAnalysis> for RecordWithAnalysisResponse {
    fn from(value: RecordWithAnalysis) -> Self {
        Self {
            record: value.record.into(),
            analysis: value.analysis.map(AnalysisResponse::from),
        }
    }
}

impl From<AnalysisAccepted> for AnalysisAcceptedResponse {
    fn from(accepted: AnalysisAccepted) -> Self {
        Self {
            message: ANALYSIS_STARTED_MESSAGE.to_owned(),
            record_id: accepted.record_id.get(),
            status: accepted.status.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisId, OwnerId, RecordId, RecordStatus};
    use crate::test_support::analysis::{FixtureClock, sample_report};
    use mockable::Clock;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn record(status: RecordStatus) -> Record {
        Record {
            id: RecordId::new(7),
            owner: OwnerId::new("owner-1").expect("owner"),
            file_name: "q1.csv".into(),
            file_type: "text/csv".into(),
            upload_date: FixtureClock::default().utc(),
            status,
            content: Some("month,revenue".into()),
            file_url: None,
        }
    }

    fn analysis() -> Analysis {
        Analysis {
            id: AnalysisId::new(3),
            record_id: RecordId::new(7),
            created_at: FixtureClock::default().utc(),
            report: sample_report(72),
        }
    }

    #[rstest]
    fn record_serialises_camel_case() {
        let value = serde_json::to_value(RecordResponse::from(record(RecordStatus::Pending)))
            .expect("serialise");
        assert_eq!(
            value,
            json!({
                "id": 7,
                "userId": "owner-1",
                "fileName": "q1.csv",
                "fileType": "text/csv",
                "uploadDate": "2026-03-01T09:30:00+00:00",
                "status": "pending",
                "content": "month,revenue",
                "fileUrl": null
            })
        );
    }

    #[rstest]
    fn listed_record_flattens_and_nests_analysis() {
        let value = serde_json::to_value(RecordWithAnalysisResponse::from(RecordWithAnalysis {
            record: record(RecordStatus::Completed),
            analysis: Some(analysis()),
        }))
        .expect("serialise");
        assert_eq!(value["fileName"], "q1.csv");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["analysis"]["healthScore"], 72);
        assert_eq!(value["analysis"]["recordId"], 7);
        assert_eq!(value["analysis"]["metrics"]["netProfit"], 25_000.0);
        assert_eq!(value["analysis"]["metrics"]["cashFlow"], Value::Null);
        assert!(value["analysis"]["aiNarrative"]
            .as_str()
            .is_some_and(|text| text.starts_with("## Summary")));
    }

    #[rstest]
    fn listed_record_without_analysis_reports_null() {
        let value = serde_json::to_value(RecordWithAnalysisResponse::from(RecordWithAnalysis {
            record: record(RecordStatus::Pending),
            analysis: None,
        }))
        .expect("serialise");
        assert_eq!(value["analysis"], Value::Null);
    }

    #[rstest]
    fn accepted_body_carries_message() {
        let body = AnalysisAcceptedResponse::from(AnalysisAccepted {
            record_id: RecordId::new(7),
            status: RecordStatus::Processing,
        });
        assert_eq!(
            serde_json::to_value(body).expect("serialise"),
            json!({"message": "Analysis started", "recordId": 7, "status": "processing"})
        );
    }
}
