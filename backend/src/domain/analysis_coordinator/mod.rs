//! Analysis lifecycle coordination.
//!
//! A trigger moves a `pending` record to `processing` and returns at once. The
//! analyzer call then runs in a supervised background task which either stores
//! the report and marks the record `completed`, or marks it `error`. Deleting
//! the record cancels the task before it writes anything. Shutting down
//! cancels it too, but the record is marked `error` so it does not stay
//! `processing` across a restart; [`fail_interrupted_analyses`] sweeps up
//! records left behind by a process that died without a clean shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AnalysisAccepted, AnalysisRepository, AnalysisRepositoryError, AnalysisTrigger,
    FinancialAnalyzer, FinancialAnalyzerError, RecordRepository, RecordRepositoryError,
};
use crate::domain::record_access::{find_owned_record, map_record_repository_error};
use crate::domain::{
    Analysis, AnalysisPrompt, Error, NewAnalysis, OwnerId, RecordId, RecordStatus,
};

mod registry;

pub use registry::{AnalysisAlreadyRunning, AnalysisClaim, AnalysisRegistry, CancelReason};

/// Default upper bound on one analyzer call.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);

/// Coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisCoordinatorConfig {
    /// Time allowed for the analyzer before the run is marked `error`.
    pub analysis_timeout: Duration,
}

impl Default for AnalysisCoordinatorConfig {
    fn default() -> Self {
        Self {
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }
}

/// Port bundle required by the coordinator.
#[derive(Clone)]
pub struct AnalysisCoordinatorPorts {
    /// Record persistence.
    pub records: Arc<dyn RecordRepository>,
    /// Analysis persistence.
    pub analyses: Arc<dyn AnalysisRepository>,
    /// External analyzer.
    pub analyzer: Arc<dyn FinancialAnalyzer>,
}

impl AnalysisCoordinatorPorts {
    /// Build a port bundle.
    pub fn new(
        records: Arc<dyn RecordRepository>,
        analyses: Arc<dyn AnalysisRepository>,
        analyzer: Arc<dyn FinancialAnalyzer>,
    ) -> Self {
        Self {
            records,
            analyses,
            analyzer,
        }
    }
}

/// Drives records through `processing` to a terminal status.
#[derive(Clone)]
pub struct AnalysisCoordinator {
    ports: AnalysisCoordinatorPorts,
    registry: Arc<AnalysisRegistry>,
    clock: Arc<dyn Clock>,
    config: AnalysisCoordinatorConfig,
}

impl AnalysisCoordinator {
    /// Create a coordinator sharing `registry` with the record service.
    pub fn new(
        ports: AnalysisCoordinatorPorts,
        registry: Arc<AnalysisRegistry>,
        clock: Arc<dyn Clock>,
        config: AnalysisCoordinatorConfig,
    ) -> Self {
        Self {
            ports,
            registry,
            clock,
            config,
        }
    }

    /// Registry supervising this coordinator's tasks.
    #[must_use]
    pub fn registry(&self) -> &Arc<AnalysisRegistry> {
        &self.registry
    }

    fn job(&self) -> AnalysisJob {
        AnalysisJob {
            ports: self.ports.clone(),
            clock: Arc::clone(&self.clock),
            timeout: self.config.analysis_timeout,
        }
    }
}

#[async_trait]
impl AnalysisTrigger for AnalysisCoordinator {
    async fn trigger(&self, owner: &OwnerId, id: RecordId) -> Result<AnalysisAccepted, Error> {
        let record = find_owned_record(self.ports.records.as_ref(), owner, id).await?;
        let claim = self.registry.try_claim(record.id).map_err(|busy| {
            Error::conflict(busy.to_string()).with_details(json!({
                "recordId": id.get(),
                "status": RecordStatus::Processing.as_str(),
            }))
        })?;

        match self
            .ports
            .records
            .set_status(record.id, RecordStatus::Processing)
            .await
        {
            Ok(_) => {}
            Err(RecordRepositoryError::InvalidTransition { from, .. }) => {
                return Err(Error::conflict(format!(
                    "record {id} is {from}; only pending records can be analysed"
                ))
                .with_details(json!({ "recordId": id.get(), "status": from.as_str() })));
            }
            Err(other) => return Err(map_record_repository_error(other)),
        }

        let content = record.content.unwrap_or_default();
        info!(record_id = %id, "analysis started");
        self.registry.spawn(self.job().run(claim, content));

        Ok(AnalysisAccepted {
            record_id: id,
            status: RecordStatus::Processing,
        })
    }
}

/// Move records stranded in `processing` to `error`.
///
/// Run once at startup, before any trigger can be accepted: no analysis task
/// exists yet, so every `processing` record belongs to a previous process.
///
/// # Errors
/// Returns [`Error`] when the repository cannot be updated.
pub async fn fail_interrupted_analyses(records: &dyn RecordRepository) -> Result<usize, Error> {
    let failed = records
        .fail_processing()
        .await
        .map_err(map_record_repository_error)?;
    if failed > 0 {
        warn!(failed, "marked interrupted analyses as errored");
    }
    Ok(failed)
}

#[derive(Debug, thiserror::Error)]
enum AnalysisFailure {
    #[error("record has no extractable content")]
    EmptyContent,
    #[error(transparent)]
    Analyzer(#[from] FinancialAnalyzerError),
    #[error(transparent)]
    Store(#[from] AnalysisRepositoryError),
    #[error(transparent)]
    Status(#[from] RecordRepositoryError),
}

impl AnalysisFailure {
    fn kind(&self) -> &'static str {
        match self {
            Self::EmptyContent => "empty_content",
            Self::Analyzer(error) => error.kind(),
            Self::Store(_) => "store",
            Self::Status(_) => "status",
        }
    }
}

struct AnalysisJob {
    ports: AnalysisCoordinatorPorts,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl AnalysisJob {
    async fn run(self, claim: AnalysisClaim, content: String) {
        let record_id = claim.record_id();
        let outcome = tokio::select! {
            biased;
            () = claim.token().cancelled() => {
                if claim.cancel_reason() == Some(CancelReason::Shutdown) {
                    warn!(%record_id, "analysis interrupted by shutdown");
                    self.mark_error(record_id).await;
                } else {
                    info!(%record_id, "analysis cancelled");
                }
                return;
            }
            outcome = self.execute(record_id, &content) => outcome,
        };

        match outcome {
            Ok(analysis) => info!(
                %record_id,
                analysis_id = %analysis.id,
                health_score = analysis.report.health_score.get(),
                "analysis completed"
            ),
            Err(failure) => {
                warn!(%record_id, kind = failure.kind(), error = %failure, "analysis failed");
                self.mark_error(record_id).await;
            }
        }
    }

    async fn execute(&self, record_id: RecordId, content: &str) -> Result<Analysis, AnalysisFailure> {
        if content.trim().is_empty() {
            return Err(AnalysisFailure::EmptyContent);
        }
        let prompt = AnalysisPrompt::for_content(content);
        if prompt.was_truncated() {
            debug!(%record_id, "document content truncated for analysis");
        }

        let report = tokio::time::timeout(self.timeout, self.ports.analyzer.analyze(&prompt))
            .await
            .map_err(|_| {
                FinancialAnalyzerError::timeout(format!(
                    "no response within {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let analysis = self
            .ports
            .analyses
            .create(NewAnalysis {
                record_id,
                created_at: self.clock.utc(),
                report,
            })
            .await?;
        self.ports
            .records
            .set_status(record_id, RecordStatus::Completed)
            .await?;
        Ok(analysis)
    }

    async fn mark_error(&self, record_id: RecordId) {
        match self
            .ports
            .records
            .set_status(record_id, RecordStatus::Error)
            .await
        {
            Ok(_) => {}
            Err(RecordRepositoryError::NotFound { .. }) => {
                debug!(%record_id, "record deleted before failure could be recorded");
            }
            Err(other) => {
                let mapped = map_record_repository_error(other);
                error!(%record_id, error = %mapped.message(), "failed to mark analysis as errored");
            }
        }
    }
}
