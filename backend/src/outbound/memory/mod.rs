//! Process-local record and analysis store.
//!
//! Used when no database is configured and by tests. One value implements
//! both [`RecordRepository`] and [`AnalysisRepository`] so that deleting a
//! record removes its analyses, matching the `ON DELETE CASCADE` behaviour of
//! the PostgreSQL adapter. Contents are lost on restart.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    AnalysisRepository, AnalysisRepositoryError, RecordRepository, RecordRepositoryError,
};
use crate::domain::{
    Analysis, AnalysisId, NewAnalysis, NewRecord, OwnerId, Record, RecordId, RecordStatus,
    RecordWithAnalysis,
};

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<RecordId, Record>,
    analyses: Vec<Analysis>,
    last_record_id: i64,
    last_analysis_id: i64,
}

impl StoreState {
    fn latest_analysis(&self, record_id: RecordId) -> Option<&Analysis> {
        self.analyses
            .iter()
            .filter(|analysis| analysis.record_id == record_id)
            .max_by_key(|analysis| analysis.recency_key())
    }
}

/// In-memory implementation of the record and analysis repositories.
#[derive(Debug, Default)]
pub struct InMemoryFinancialStore {
    state: Mutex<StoreState>,
}

impl InMemoryFinancialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    /// Number of stored analyses across all records.
    #[must_use]
    pub fn analysis_count(&self) -> usize {
        self.lock().analyses.len()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordRepository for InMemoryFinancialStore {
    async fn create(&self, record: NewRecord) -> Result<Record, RecordRepositoryError> {
        let mut state = self.lock();
        state.last_record_id += 1;
        let stored = record.into_record(RecordId::new(state.last_record_id));
        state.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_for_owner(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<RecordWithAnalysis>, RecordRepositoryError> {
        let state = self.lock();
        let mut listed: Vec<RecordWithAnalysis> = state
            .records
            .values()
            .filter(|record| record.is_owned_by(owner))
            .map(|record| RecordWithAnalysis {
                record: record.clone(),
                analysis: state.latest_analysis(record.id).cloned(),
            })
            .collect();
        listed.sort_by(|a, b| {
            (b.record.upload_date, b.record.id).cmp(&(a.record.upload_date, a.record.id))
        });
        Ok(listed)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, RecordRepositoryError> {
        Ok(self.lock().records.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: RecordId,
        status: RecordStatus,
    ) -> Result<Record, RecordRepositoryError> {
        let mut state = self.lock();
        let record = state
            .records
            .get_mut(&id)
            .ok_or(RecordRepositoryError::NotFound { id })?;
        if !record.status.can_transition_to(status) {
            return Err(RecordRepositoryError::invalid_transition(
                record.status,
                status,
            ));
        }
        record.status = status;
        Ok(record.clone())
    }

    async fn fail_processing(&self) -> Result<usize, RecordRepositoryError> {
        let mut state = self.lock();
        let mut failed = 0;
        for record in state.records.values_mut() {
            if record.status == RecordStatus::Processing {
                record.status = RecordStatus::Error;
                failed += 1;
            }
        }
        Ok(failed)
    }

    async fn delete(&self, id: RecordId) -> Result<bool, RecordRepositoryError> {
        let mut state = self.lock();
        let removed = state.records.remove(&id).is_some();
        if removed {
            state.analyses.retain(|analysis| analysis.record_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryFinancialStore {
    async fn create(&self, analysis: NewAnalysis) -> Result<Analysis, AnalysisRepositoryError> {
        let mut state = self.lock();
        if !state.records.contains_key(&analysis.record_id) {
            return Err(AnalysisRepositoryError::MissingRecord {
                record_id: analysis.record_id,
            });
        }
        state.last_analysis_id += 1;
        let stored = analysis.into_analysis(AnalysisId::new(state.last_analysis_id));
        state.analyses.push(stored.clone());
        Ok(stored)
    }

    async fn latest_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Option<Analysis>, AnalysisRepositoryError> {
        Ok(self.lock().latest_analysis(record_id).cloned())
    }
}
