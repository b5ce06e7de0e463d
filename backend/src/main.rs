//! Backend entry-point: loads settings, wires adapters, and runs the HTTP server.

mod server;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::SameSite;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use finlens::domain::{AnalysisCoordinatorConfig, fail_interrupted_analyses};
use finlens::domain::ports::{DisabledFinancialAnalyzer, FinancialAnalyzer};
use finlens::inbound::http::health::HealthState;
use finlens::outbound::openai::OpenAiChatAnalyzer;
use finlens::outbound::persistence::{DbPool, DieselRecordRepository, PoolConfig};
use finlens::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Time running analyses get to observe cancellation after the listener stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let key = settings
        .session_key(cfg!(debug_assertions))
        .map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    settings
        .check_fixture_login(cfg!(debug_assertions))
        .map_err(io::Error::other)?;

    let mut config = ServerConfig::new(key, settings.cookie_secure(), SameSite::Lax, bind_addr)
        .with_analyzer(build_analyzer(&settings)?)
        .with_analysis_config(AnalysisCoordinatorConfig {
            analysis_timeout: settings.analysis_timeout(),
        })
        .with_upload_policy(settings.upload_policy());

    if let Some(url) = settings.database_url() {
        let mut pool_config = PoolConfig::new(url);
        if let Some(max) = settings.database_max_connections {
            pool_config = pool_config.with_max_size(max);
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|e| io::Error::other(format!("database pool: {e}")))?;
        fail_interrupted_analyses(&DieselRecordRepository::new(pool.clone()))
            .await
            .map_err(|e| io::Error::other(format!("startup sweep: {}", e.message())))?;
        config = config.with_db_pool(pool);
    }

    let registry = config.registry();
    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    let result = create_server(health_state.clone(), config)?.await;

    health_state.mark_unhealthy();
    registry.shutdown(SHUTDOWN_GRACE).await;
    result
}

fn build_analyzer(settings: &AppSettings) -> io::Result<Arc<dyn FinancialAnalyzer>> {
    let Some(api_key) = settings.ai_api_key() else {
        warn!("no AI API key configured; analyses will fail");
        return Ok(Arc::new(DisabledFinancialAnalyzer));
    };
    let analyzer = OpenAiChatAnalyzer::new(
        settings.ai_endpoint().map_err(io::Error::other)?,
        api_key.as_str(),
        settings.ai_model(),
        settings.ai_request_timeout(),
    )
    .map_err(|e| io::Error::other(format!("AI client: {e}")))?;
    Ok(Arc::new(analyzer))
}
