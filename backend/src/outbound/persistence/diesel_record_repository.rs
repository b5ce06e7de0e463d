//! PostgreSQL-backed `RecordRepository` implementation using Diesel ORM.
//!
//! Status changes are a single conditional `UPDATE ... WHERE status IN
//! (predecessors)`, so two writers racing on one record cannot both win.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecordRepository, RecordRepositoryError};
use crate::domain::{
    Analysis, NewRecord, OwnerId, Record, RecordId, RecordStatus, RecordWithAnalysis,
};

use super::diesel_analysis_repository::row_to_analysis;
use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AnalysisRow, NewRecordRow, RecordRow};
use super::pool::{DbPool, PoolError};
use super::schema::{analyses, records};

/// Diesel-backed implementation of the record repository port.
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
}

impl DieselRecordRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecordRepositoryError {
    map_basic_pool_error(error, RecordRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecordRepositoryError {
    map_basic_diesel_error(
        error,
        RecordRepositoryError::query,
        RecordRepositoryError::connection,
    )
}

fn parse_status(raw: &str) -> Result<RecordStatus, RecordRepositoryError> {
    raw.parse()
        .map_err(|err| RecordRepositoryError::query(format!("stored record status: {err}")))
}

/// Convert a database row into a domain record.
fn row_to_record(row: RecordRow) -> Result<Record, RecordRepositoryError> {
    let status = parse_status(&row.status)?;
    let owner = OwnerId::new(&row.owner_id)
        .map_err(|err| RecordRepositoryError::query(format!("stored owner id: {err}")))?;
    Ok(Record {
        id: RecordId::new(row.id),
        owner,
        file_name: row.file_name,
        file_type: row.file_type,
        upload_date: row.upload_date,
        status,
        content: row.content,
        file_url: row.file_url,
    })
}

fn latest_by_record(
    rows: Vec<AnalysisRow>,
) -> Result<HashMap<RecordId, Analysis>, RecordRepositoryError> {
    let mut latest: HashMap<RecordId, Analysis> = HashMap::new();
    for row in rows {
        let analysis = row_to_analysis(row)
            .map_err(|err| RecordRepositoryError::query(err.to_string()))?;
        let newer = latest
            .get(&analysis.record_id)
            .is_none_or(|current| analysis.recency_key() > current.recency_key());
        if newer {
            latest.insert(analysis.record_id, analysis);
        }
    }
    Ok(latest)
}

#[async_trait]
impl RecordRepository for DieselRecordRepository {
    async fn create(&self, record: NewRecord) -> Result<Record, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewRecordRow {
            owner_id: record.owner.as_str(),
            file_name: &record.file_name,
            file_type: &record.file_type,
            upload_date: record.upload_date,
            content: record.content.as_deref(),
            file_url: record.file_url.as_deref(),
        };

        let stored: RecordRow = diesel::insert_into(records::table)
            .values(&row)
            .returning(RecordRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_record(stored)
    }

    async fn list_for_owner(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<RecordWithAnalysis>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RecordRow> = records::table
            .filter(records::owner_id.eq(owner.as_str()))
            .order((records::upload_date.desc(), records::id.desc()))
            .select(RecordRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let analysis_rows: Vec<AnalysisRow> = if ids.is_empty() {
            Vec::new()
        } else {
            analyses::table
                .filter(analyses::record_id.eq_any(&ids))
                .select(AnalysisRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?
        };
        let mut latest = latest_by_record(analysis_rows)?;

        rows.into_iter()
            .map(|row| {
                let record = row_to_record(row)?;
                let analysis = latest.remove(&record.id);
                Ok(RecordWithAnalysis { record, analysis })
            })
            .collect()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RecordRow> = records::table
            .find(id.get())
            .select(RecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn set_status(
        &self,
        id: RecordId,
        status: RecordStatus,
    ) -> Result<Record, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let allowed_from: Vec<&str> = status
            .predecessors()
            .iter()
            .map(|from| from.as_str())
            .collect();

        let updated: Option<RecordRow> = diesel::update(
            records::table
                .filter(records::id.eq(id.get()))
                .filter(records::status.eq_any(allowed_from)),
        )
        .set(records::status.eq(status.as_str()))
        .returning(RecordRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = updated {
            return row_to_record(row);
        }

        let current: Option<String> = records::table
            .find(id.get())
            .select(records::status)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match current {
            None => Err(RecordRepositoryError::not_found(id)),
            Some(raw) => Err(RecordRepositoryError::invalid_transition(
                parse_status(&raw)?,
                status,
            )),
        }
    }

    async fn fail_processing(&self) -> Result<usize, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stranded = records::table.filter(records::status.eq(RecordStatus::Processing.as_str()));
        diesel::update(stranded)
            .set(records::status.eq(RecordStatus::Error.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: RecordId) -> Result<bool, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(records::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
