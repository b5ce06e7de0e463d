//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};

use crate::Trace;
use crate::domain::ports::{
    FIXTURE_ACCOUNTS, FIXTURE_PASSWORD, FinancialAnalyzer, FixtureLoginService,
};
use crate::domain::{
    AnalysisCoordinator, AnalysisCoordinatorConfig, AnalysisCoordinatorPorts, AnalysisRegistry,
    RecordService, UploadPolicy,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::users::LoginRequest;
use crate::outbound::memory::InMemoryFinancialStore;
use crate::test_support::analysis::FixtureClock;

/// Owner id of the `admin` development account.
pub const ADMIN_OWNER: &str = FIXTURE_ACCOUNTS[0].1;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Application exposing the full `/api` surface over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(
            web::scope("/api")
                .wrap(test_session_middleware())
                .configure(configure_api),
        )
}

/// Log in as `username` and return the issued session cookie.
pub async fn login_cookie_as<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/login")
        .set_json(&LoginRequest {
            username: username.to_owned(),
            password: FIXTURE_PASSWORD.to_owned(),
        })
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "login as {username} failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// Log in as the `admin` development account.
pub async fn login_cookie<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    login_cookie_as(app, FIXTURE_ACCOUNTS[0].0).await
}

/// Boundary used by [`multipart_file`].
pub const MULTIPART_BOUNDARY: &str = "finlens-test-boundary";

/// Encode a single-part multipart body; returns `(content_type, body)`.
pub fn multipart_file(field: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        body,
    )
}

/// HTTP state wired to an in-memory store, plus handles for assertions.
pub struct InMemoryHarness {
    pub state: HttpState,
    pub store: Arc<InMemoryFinancialStore>,
    pub registry: Arc<AnalysisRegistry>,
}

impl InMemoryHarness {
    /// Wire the real services around `analyzer` with the given limits.
    pub fn new(
        analyzer: Arc<dyn FinancialAnalyzer>,
        analysis_timeout: Duration,
        upload_policy: UploadPolicy,
    ) -> Self {
        let store = Arc::new(InMemoryFinancialStore::new());
        let registry = Arc::new(AnalysisRegistry::new());
        let clock = Arc::new(FixtureClock::default());
        let records = Arc::new(RecordService::new(
            store.clone(),
            store.clone(),
            registry.clone(),
            clock.clone(),
        ));
        let coordinator = AnalysisCoordinator::new(
            AnalysisCoordinatorPorts::new(store.clone(), store.clone(), analyzer),
            registry.clone(),
            clock,
            AnalysisCoordinatorConfig { analysis_timeout },
        );
        let state = HttpState::new(
            HttpStatePorts {
                login: Arc::new(FixtureLoginService),
                records: records.clone(),
                records_query: records,
                analysis: Arc::new(coordinator),
            },
            upload_policy,
        );
        Self {
            state,
            store,
            registry,
        }
    }
}
