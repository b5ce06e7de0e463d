//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::UploadPolicy;
use crate::domain::ports::{AnalysisTrigger, LoginService, RecordCommand, RecordQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub records: Arc<dyn RecordCommand>,
    pub records_query: Arc<dyn RecordQuery>,
    pub analysis: Arc<dyn AnalysisTrigger>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub records: Arc<dyn RecordCommand>,
    pub records_query: Arc<dyn RecordQuery>,
    pub analysis: Arc<dyn AnalysisTrigger>,
    pub upload_policy: UploadPolicy,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, UploadPolicy::default())
    }
}

impl HttpState {
    /// Construct state from a ports bundle and the upload limits to enforce.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use finlens::domain::ports::{DisabledFinancialAnalyzer, FixtureLoginService};
    /// use finlens::domain::{
    ///     AnalysisCoordinator, AnalysisCoordinatorConfig, AnalysisCoordinatorPorts,
    ///     AnalysisRegistry, RecordService, UploadPolicy,
    /// };
    /// use finlens::inbound::http::state::{HttpState, HttpStatePorts};
    /// use finlens::outbound::memory::InMemoryFinancialStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryFinancialStore::new());
    /// let registry = Arc::new(AnalysisRegistry::new());
    /// let clock = Arc::new(DefaultClock);
    /// let records = Arc::new(RecordService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     registry.clone(),
    ///     clock.clone(),
    /// ));
    /// let coordinator = AnalysisCoordinator::new(
    ///     AnalysisCoordinatorPorts::new(
    ///         store.clone(),
    ///         store,
    ///         Arc::new(DisabledFinancialAnalyzer),
    ///     ),
    ///     registry,
    ///     clock,
    ///     AnalysisCoordinatorConfig::default(),
    /// );
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         login: Arc::new(FixtureLoginService),
    ///         records: records.clone(),
    ///         records_query: records,
    ///         analysis: Arc::new(coordinator),
    ///     },
    ///     UploadPolicy::new(1024),
    /// );
    /// assert_eq!(state.upload_policy.max_bytes(), 1024);
    /// ```
    pub fn new(ports: HttpStatePorts, upload_policy: UploadPolicy) -> Self {
        let HttpStatePorts {
            login,
            records,
            records_query,
            analysis,
        } = ports;
        Self {
            login,
            records,
            records_query,
            analysis,
            upload_policy,
        }
    }
}
