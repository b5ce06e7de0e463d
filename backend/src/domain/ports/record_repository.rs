//! Driven port for record persistence.

use async_trait::async_trait;

use crate::domain::{NewRecord, OwnerId, Record, RecordId, RecordStatus, RecordWithAnalysis};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record repository adapters.
    pub enum RecordRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "record repository query failed: {message}",
        /// No record exists with the given id.
        NotFound { id: RecordId } => "record {id} not found",
        /// The record's current status does not permit the requested move.
        InvalidTransition { from: RecordStatus, to: RecordStatus } =>
            "record cannot move from {from} to {to}",
    }
}

/// Port for storing financial document records.
///
/// Status changes must be atomic: an adapter applies `set_status` only when
/// the stored status is one of [`RecordStatus::predecessors`] of the target,
/// so concurrent writers cannot skip or rewind the lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert a record with status `pending` and return it with its id.
    async fn create(&self, record: NewRecord) -> Result<Record, RecordRepositoryError>;

    /// List an owner's records, newest upload first, each joined with its
    /// latest analysis.
    async fn list_for_owner(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<RecordWithAnalysis>, RecordRepositoryError>;

    /// Find a record by id regardless of owner.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, RecordRepositoryError>;

    /// Move a record to `status`, returning the updated record.
    async fn set_status(
        &self,
        id: RecordId,
        status: RecordStatus,
    ) -> Result<Record, RecordRepositoryError>;

    /// Move every `processing` record to `error`, returning how many moved.
    async fn fail_processing(&self) -> Result<usize, RecordRepositoryError>;

    /// Delete a record and its analyses. Returns `false` when nothing was
    /// deleted.
    async fn delete(&self, id: RecordId) -> Result<bool, RecordRepositoryError>;
}
