//! Record domain service implementing the upload, delete and read use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::AnalysisRegistry;
use crate::domain::Error;
use crate::domain::ports::{
    AnalysisRepository, RecordCommand, RecordQuery, RecordRepository, UploadRecordRequest,
};
use crate::domain::record_access::{
    find_owned_record, map_analysis_repository_error, map_record_repository_error,
    record_not_found,
};
use crate::domain::{Analysis, NewRecord, OwnerId, Record, RecordId, RecordWithAnalysis};

/// Record service backed by record and analysis repositories.
///
/// Deleting a record cancels its in-flight analysis through the shared
/// [`AnalysisRegistry`] before the rows are removed.
pub struct RecordService<R: ?Sized, A: ?Sized> {
    records: Arc<R>,
    analyses: Arc<A>,
    registry: Arc<AnalysisRegistry>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized, A: ?Sized> Clone for RecordService<R, A> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            analyses: Arc::clone(&self.analyses),
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: ?Sized, A: ?Sized> RecordService<R, A> {
    /// Create a service over the given repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use finlens::domain::{AnalysisRegistry, RecordService};
    /// use finlens::outbound::memory::InMemoryFinancialStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryFinancialStore::default());
    /// let _service = RecordService::new(
    ///     Arc::clone(&store),
    ///     store,
    ///     Arc::new(AnalysisRegistry::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// ```
    pub fn new(
        records: Arc<R>,
        analyses: Arc<A>,
        registry: Arc<AnalysisRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            analyses,
            registry,
            clock,
        }
    }
}

#[async_trait]
impl<R, A> RecordCommand for RecordService<R, A>
where
    R: RecordRepository + ?Sized,
    A: AnalysisRepository + ?Sized,
{
    async fn upload(&self, request: UploadRecordRequest) -> Result<Record, Error> {
        let UploadRecordRequest {
            owner,
            document,
            file_url,
        } = request;
        let (file_name, file_type, content) = document.into_parts();
        let content_chars = content.chars().count();

        let record = self
            .records
            .create(NewRecord {
                owner,
                file_name,
                file_type,
                upload_date: self.clock.utc(),
                content: Some(content),
                file_url,
            })
            .await
            .map_err(map_record_repository_error)?;

        info!(
            record_id = %record.id,
            owner = %record.owner,
            file_type = %record.file_type,
            content_chars,
            "record uploaded"
        );
        Ok(record)
    }

    async fn delete(&self, owner: &OwnerId, id: RecordId) -> Result<(), Error> {
        let record = find_owned_record(self.records.as_ref(), owner, id).await?;
        let cancelled = self.registry.cancel(record.id);

        let deleted = self
            .records
            .delete(record.id)
            .await
            .map_err(map_record_repository_error)?;
        if !deleted {
            return Err(record_not_found(id));
        }

        info!(record_id = %id, cancelled_analysis = cancelled, "record deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, A> RecordQuery for RecordService<R, A>
where
    R: RecordRepository + ?Sized,
    A: AnalysisRepository + ?Sized,
{
    async fn list(&self, owner: &OwnerId) -> Result<Vec<RecordWithAnalysis>, Error> {
        self.records
            .list_for_owner(owner)
            .await
            .map_err(map_record_repository_error)
    }

    async fn get(&self, owner: &OwnerId, id: RecordId) -> Result<Record, Error> {
        find_owned_record(self.records.as_ref(), owner, id).await
    }

    async fn latest_analysis(&self, owner: &OwnerId, id: RecordId) -> Result<Analysis, Error> {
        let record = find_owned_record(self.records.as_ref(), owner, id).await?;
        self.analyses
            .latest_for_record(record.id)
            .await
            .map_err(map_analysis_repository_error)?
            .ok_or_else(|| {
                Error::not_found("Analysis not found").with_details(json!({
                    "recordId": id.get(),
                    "status": record.status.as_str(),
                }))
            })
    }
}

#[cfg(test)]
#[path = "record_service_tests.rs"]
mod tests;
