//! Driving port for record mutations (upload and delete).

use async_trait::async_trait;

use crate::domain::{Error, OwnerId, Record, RecordId, UploadedDocument};

/// Request to store a validated upload.
#[derive(Debug, Clone)]
pub struct UploadRecordRequest {
    /// Authenticated uploader.
    pub owner: OwnerId,
    /// Validated document.
    pub document: UploadedDocument,
    /// Optional external storage pointer.
    pub file_url: Option<String>,
}

/// Domain use-case port for creating and deleting records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordCommand: Send + Sync {
    /// Store an upload as a new `pending` record.
    async fn upload(&self, request: UploadRecordRequest) -> Result<Record, Error>;

    /// Delete an owner's record, cancelling any in-flight analysis.
    async fn delete(&self, owner: &OwnerId, id: RecordId) -> Result<(), Error>;
}
