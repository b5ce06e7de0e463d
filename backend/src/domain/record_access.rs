//! Shared helpers for services that read records on behalf of an owner.

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{AnalysisRepositoryError, RecordRepository, RecordRepositoryError};
use crate::domain::{OwnerId, Record, RecordId};

pub(crate) fn map_record_repository_error(error: RecordRepositoryError) -> Error {
    match error {
        RecordRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("record repository unavailable: {message}"))
        }
        RecordRepositoryError::Query { message } => {
            Error::internal(format!("record repository error: {message}"))
        }
        RecordRepositoryError::NotFound { id } => record_not_found(id),
        RecordRepositoryError::InvalidTransition { from, to } => {
            Error::conflict(format!("record cannot move from {from} to {to}"))
                .with_details(json!({ "status": from.as_str(), "requested": to.as_str() }))
        }
    }
}

pub(crate) fn map_analysis_repository_error(error: AnalysisRepositoryError) -> Error {
    match error {
        AnalysisRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("analysis repository unavailable: {message}"))
        }
        AnalysisRepositoryError::Query { message } => {
            Error::internal(format!("analysis repository error: {message}"))
        }
        AnalysisRepositoryError::MissingRecord { record_id } => record_not_found(record_id),
    }
}

pub(crate) fn record_not_found(id: RecordId) -> Error {
    Error::not_found(format!("record {id} not found")).with_details(json!({ "recordId": id.get() }))
}

/// Load a record visible to `owner`; foreign records are reported as absent.
pub(crate) async fn find_owned_record<R>(
    records: &R,
    owner: &OwnerId,
    id: RecordId,
) -> Result<Record, Error>
where
    R: RecordRepository + ?Sized,
{
    records
        .find_by_id(id)
        .await
        .map_err(map_record_repository_error)?
        .filter(|record| record.is_owned_by(owner))
        .ok_or_else(|| record_not_found(id))
}
