//! PostgreSQL-backed `AnalysisRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AnalysisRepository, AnalysisRepositoryError};
use crate::domain::{
    Analysis, AnalysisId, AnalysisReport, FinancialMetrics, HealthScore, NewAnalysis, RecordId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AnalysisRow, NewAnalysisRow};
use super::pool::{DbPool, PoolError};
use super::schema::analyses;

/// Diesel-backed implementation of the analysis repository port.
#[derive(Clone)]
pub struct DieselAnalysisRepository {
    pool: DbPool,
}

impl DieselAnalysisRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AnalysisRepositoryError {
    map_basic_pool_error(error, AnalysisRepositoryError::connection)
}

fn map_diesel_error(error: DieselError, record_id: RecordId) -> AnalysisRepositoryError {
    if let DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) = &error {
        return AnalysisRepositoryError::missing_record(record_id);
    }
    map_basic_diesel_error(
        error,
        AnalysisRepositoryError::query,
        AnalysisRepositoryError::connection,
    )
}

/// Convert a stored row back into a domain analysis.
pub(super) fn row_to_analysis(row: AnalysisRow) -> Result<Analysis, AnalysisRepositoryError> {
    let metrics: FinancialMetrics = serde_json::from_value(row.metrics)
        .map_err(|err| AnalysisRepositoryError::query(format!("stored metrics: {err}")))?;
    let health_score = HealthScore::new(i64::from(row.health_score))
        .map_err(|err| AnalysisRepositoryError::query(format!("stored health score: {err}")))?;

    Ok(Analysis {
        id: AnalysisId::new(row.id),
        record_id: RecordId::new(row.record_id),
        created_at: row.created_at,
        report: AnalysisReport {
            metrics,
            health_score,
            risks: row.risks,
            opportunities: row.opportunities,
            recommendations: row.recommendations,
            narrative: row.ai_narrative,
        },
    })
}

#[async_trait]
impl AnalysisRepository for DieselAnalysisRepository {
    async fn create(&self, analysis: NewAnalysis) -> Result<Analysis, AnalysisRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record_id = analysis.record_id;
        let report = &analysis.report;
        let metrics = serde_json::to_value(report.metrics)
            .map_err(|err| AnalysisRepositoryError::query(format!("serialise metrics: {err}")))?;

        let row = NewAnalysisRow {
            record_id: record_id.get(),
            created_at: analysis.created_at,
            metrics,
            health_score: i16::from(report.health_score.get()),
            risks: &report.risks,
            opportunities: &report.opportunities,
            recommendations: &report.recommendations,
            ai_narrative: &report.narrative,
        };

        let stored: AnalysisRow = diesel::insert_into(analyses::table)
            .values(&row)
            .returning(AnalysisRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, record_id))?;

        row_to_analysis(stored)
    }

    async fn latest_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Option<Analysis>, AnalysisRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AnalysisRow> = analyses::table
            .filter(analyses::record_id.eq(record_id.get()))
            .order((analyses::created_at.desc(), analyses::id.desc()))
            .select(AnalysisRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, record_id))?;

        row.map(row_to_analysis).transpose()
    }
}
