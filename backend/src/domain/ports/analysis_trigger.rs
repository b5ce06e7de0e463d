//! Driving port for starting an analysis.

use async_trait::async_trait;

use crate::domain::{Error, OwnerId, RecordId, RecordStatus};

/// Acknowledgement that an analysis was accepted and is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisAccepted {
    /// Record being analysed.
    pub record_id: RecordId,
    /// Status the record moved to.
    pub status: RecordStatus,
}

/// Domain use-case port for requesting an analysis.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisTrigger: Send + Sync {
    /// Move the record to `processing` and start the analysis in the
    /// background. Returns before the analyzer is called.
    async fn trigger(&self, owner: &OwnerId, id: RecordId) -> Result<AnalysisAccepted, Error>;
}
