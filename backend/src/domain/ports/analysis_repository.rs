//! Driven port for analysis persistence.

use async_trait::async_trait;

use crate::domain::{Analysis, NewAnalysis, RecordId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by analysis repository adapters.
    pub enum AnalysisRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "analysis repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "analysis repository query failed: {message}",
        /// The owning record no longer exists.
        MissingRecord { record_id: RecordId } => "record {record_id} no longer exists",
    }
}

/// Port for storing immutable analysis results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Insert an analysis and return it with its id.
    async fn create(&self, analysis: NewAnalysis) -> Result<Analysis, AnalysisRepositoryError>;

    /// Newest analysis for a record by `(created_at, id)`, if any.
    async fn latest_for_record(
        &self,
        record_id: RecordId,
    ) -> Result<Option<Analysis>, AnalysisRepositoryError>;
}
