//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use finlens::domain::ports::{DisabledFinancialAnalyzer, FinancialAnalyzer};
use finlens::domain::{AnalysisCoordinatorConfig, AnalysisRegistry, UploadPolicy};
use finlens::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) analyzer: Arc<dyn FinancialAnalyzer>,
    pub(crate) analysis: AnalysisCoordinatorConfig,
    pub(crate) upload_policy: UploadPolicy,
    pub(crate) registry: Arc<AnalysisRegistry>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Starts with the in-memory store and an analyzer that rejects every
    /// request until one is attached.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            analyzer: Arc::new(DisabledFinancialAnalyzer),
            analysis: AnalysisCoordinatorConfig::default(),
            upload_policy: UploadPolicy::default(),
            registry: Arc::new(AnalysisRegistry::new()),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, records and analyses are stored in PostgreSQL instead
    /// of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Use `analyzer` for analyses.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn FinancialAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Override coordinator tuning.
    #[must_use]
    pub fn with_analysis_config(mut self, analysis: AnalysisCoordinatorConfig) -> Self {
        self.analysis = analysis;
        self
    }

    /// Override upload limits.
    #[must_use]
    pub fn with_upload_policy(mut self, upload_policy: UploadPolicy) -> Self {
        self.upload_policy = upload_policy;
        self
    }

    /// Registry supervising background analyses; used to drain on shutdown.
    #[must_use]
    pub fn registry(&self) -> Arc<AnalysisRegistry> {
        Arc::clone(&self.registry)
    }
}
