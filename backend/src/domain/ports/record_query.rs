//! Driving port for record and analysis reads.

use async_trait::async_trait;

use crate::domain::{Analysis, Error, OwnerId, Record, RecordId, RecordWithAnalysis};

/// Domain use-case port for reading records and their analyses.
///
/// Records owned by someone else are reported as not found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordQuery: Send + Sync {
    /// List the owner's records with their latest analyses.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<RecordWithAnalysis>, Error>;

    /// Fetch one record.
    async fn get(&self, owner: &OwnerId, id: RecordId) -> Result<Record, Error>;

    /// Fetch the latest analysis for a record.
    async fn latest_analysis(&self, owner: &OwnerId, id: RecordId) -> Result<Analysis, Error>;
}
