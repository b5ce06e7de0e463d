//! Builders wiring repositories and services into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use finlens::domain::ports::{AnalysisRepository, FixtureLoginService, RecordRepository};
use finlens::domain::{
    AnalysisCoordinator, AnalysisCoordinatorPorts, RecordService,
};
use finlens::inbound::http::state::{HttpState, HttpStatePorts};
use finlens::outbound::memory::InMemoryFinancialStore;
use finlens::outbound::persistence::{DieselAnalysisRepository, DieselRecordRepository};

use super::ServerConfig;

/// Build HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a process-local store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL record store");
            build_with_repositories(
                Arc::new(DieselRecordRepository::new(pool.clone())),
                Arc::new(DieselAnalysisRepository::new(pool.clone())),
                config,
            )
        }
        None => {
            info!("no database configured; records are kept in memory");
            let store = Arc::new(InMemoryFinancialStore::new());
            build_with_repositories(Arc::clone(&store), store, config)
        }
    }
}

fn build_with_repositories<R, A>(
    records: Arc<R>,
    analyses: Arc<A>,
    config: &ServerConfig,
) -> web::Data<HttpState>
where
    R: RecordRepository + 'static,
    A: AnalysisRepository + 'static,
{
    let clock = Arc::new(DefaultClock);
    let record_service = Arc::new(RecordService::new(
        Arc::clone(&records),
        Arc::clone(&analyses),
        config.registry(),
        clock.clone(),
    ));
    let coordinator = AnalysisCoordinator::new(
        AnalysisCoordinatorPorts::new(records, analyses, Arc::clone(&config.analyzer)),
        config.registry(),
        clock,
        config.analysis,
    );

    web::Data::new(HttpState::new(
        HttpStatePorts {
            login: Arc::new(FixtureLoginService),
            records: record_service.clone(),
            records_query: record_service,
            analysis: Arc::new(coordinator),
        },
        config.upload_policy,
    ))
}
