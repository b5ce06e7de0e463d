//! End-to-end analysis lifecycle over the HTTP surface and the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::Value;

use finlens::domain::ports::{FinancialAnalyzer, FinancialAnalyzerError};
use finlens::domain::{DEFAULT_ANALYSIS_TIMEOUT, UploadPolicy};
use finlens::inbound::http::test_utils::{
    InMemoryHarness, login_cookie, multipart_file, test_app,
};
use finlens::test_support::analysis::{
    GatedAnalyzer, RawTextAnalyzer, ScriptedAnalyzer, StalledAnalyzer, sample_report,
};

const STATEMENT: &[u8] = b"month,revenue,expenses\nJan,120000,95000\n";
const QUARTER: &[u8] = b"Revenue,100\nExpenses,50";
const QUARTER_REPLY: &str = r#"{"metrics":{"revenue":100,"expenses":50,"netProfit":50},"healthScore":72,"risks":[],"opportunities":[],"recommendations":[],"aiNarrative":"Stable."}"#;

fn harness(analyzer: Arc<dyn FinancialAnalyzer>, timeout: Duration) -> InMemoryHarness {
    InMemoryHarness::new(analyzer, timeout, UploadPolicy::default())
}

async fn upload<S>(app: &S, cookie: &Cookie<'static>) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    upload_file(app, cookie, "statement.csv", STATEMENT).await
}

async fn upload_file<S>(app: &S, cookie: &Cookie<'static>, file_name: &str, bytes: &[u8]) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (content_type, body) = multipart_file("file", file_name, bytes);
    let request = actix_test::TestRequest::post()
        .uri("/api/files")
        .insert_header((CONTENT_TYPE, content_type))
        .cookie(cookie.clone())
        .set_payload(body)
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(response).await;
    assert_eq!(created["status"], "pending");
    created["id"].as_i64().expect("record id")
}

async fn call<S>(app: &S, request: actix_test::TestRequest, cookie: &Cookie<'static>) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(app, request.cookie(cookie.clone()).to_request()).await
}

async fn trigger<S>(app: &S, cookie: &Cookie<'static>, id: i64) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    call(
        app,
        actix_test::TestRequest::post().uri(&format!("/api/files/{id}/analyze")),
        cookie,
    )
    .await
}

async fn record_json<S>(app: &S, cookie: &Cookie<'static>, id: i64) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = call(
        app,
        actix_test::TestRequest::get().uri(&format!("/api/files/{id}")),
        cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    actix_test::read_body_json(response).await
}

#[actix_web::test]
async fn successful_analysis_completes_record() {
    let analyzer = Arc::new(ScriptedAnalyzer::succeeding(sample_report(72)));
    let harness = harness(analyzer.clone(), DEFAULT_ANALYSIS_TIMEOUT);
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload(&app, &cookie).await;

    let accepted = trigger(&app, &cookie, id).await;
    assert_eq!(accepted.status(), StatusCode::ACCEPTED);
    let body: Value = actix_test::read_body_json(accepted).await;
    assert_eq!(body["message"], "Analysis started");
    assert_eq!(body["recordId"], id);
    assert_eq!(body["status"], "processing");

    harness.registry.wait_idle().await;

    assert_eq!(record_json(&app, &cookie, id).await["status"], "completed");
    let response = call(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/files/{id}/analysis")),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let analysis: Value = actix_test::read_body_json(response).await;
    assert_eq!(analysis["recordId"], id);
    assert_eq!(analysis["healthScore"], 72);
    assert_eq!(analysis["metrics"]["revenue"], 120_000.0);
    assert!(analysis["aiNarrative"].as_str().is_some_and(|text| !text.is_empty()));

    let listed: Value = actix_test::read_body_json(
        call(&app, actix_test::TestRequest::get().uri("/api/files"), &cookie).await,
    )
    .await;
    assert_eq!(listed[0]["analysis"]["healthScore"], 72);

    let prompts = analyzer.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Jan,120000,95000"));
}

#[actix_web::test]
async fn provider_reply_is_decoded_into_completed_analysis() {
    let analyzer = Arc::new(RawTextAnalyzer::new(QUARTER_REPLY));
    let harness = harness(analyzer.clone(), DEFAULT_ANALYSIS_TIMEOUT);
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload_file(&app, &cookie, "q1.csv", QUARTER).await;

    let accepted = trigger(&app, &cookie, id).await;
    assert_eq!(accepted.status(), StatusCode::ACCEPTED);
    let body: Value = actix_test::read_body_json(accepted).await;
    assert_eq!(body["status"], "processing");

    harness.registry.wait_idle().await;

    assert_eq!(record_json(&app, &cookie, id).await["status"], "completed");
    let response = call(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/files/{id}/analysis")),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let analysis: Value = actix_test::read_body_json(response).await;
    assert_eq!(analysis["healthScore"], 72);
    assert_eq!(analysis["metrics"]["netProfit"], 50.0);
    assert_eq!(analysis["aiNarrative"], "Stable.");
    assert_eq!(harness.store.analysis_count(), 1);
    assert_eq!(analyzer.calls(), 1);
}

#[actix_web::test]
async fn undecodable_provider_reply_leaves_no_analysis() {
    let analyzer = Arc::new(RawTextAnalyzer::new("Sure! Here is the analysis you asked for."));
    let harness = harness(analyzer.clone(), DEFAULT_ANALYSIS_TIMEOUT);
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload_file(&app, &cookie, "q1.csv", QUARTER).await;

    assert_eq!(trigger(&app, &cookie, id).await.status(), StatusCode::ACCEPTED);
    harness.registry.wait_idle().await;

    assert_eq!(record_json(&app, &cookie, id).await["status"], "error");
    assert_eq!(harness.store.analysis_count(), 0);
    assert_eq!(analyzer.calls(), 1);
}

#[rstest]
#[case::invalid_json(FinancialAnalyzerError::decode("expected value at line 1 column 1"))]
#[case::transport(FinancialAnalyzerError::transport("connection refused"))]
#[case::unavailable(FinancialAnalyzerError::unavailable("no key"))]
#[actix_web::test]
async fn analyzer_failure_marks_record_error(#[case] failure: FinancialAnalyzerError) {
    let harness = harness(
        Arc::new(ScriptedAnalyzer::failing(failure)),
        DEFAULT_ANALYSIS_TIMEOUT,
    );
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload(&app, &cookie).await;

    assert_eq!(trigger(&app, &cookie, id).await.status(), StatusCode::ACCEPTED);
    harness.registry.wait_idle().await;

    assert_eq!(record_json(&app, &cookie, id).await["status"], "error");
    assert_eq!(harness.store.analysis_count(), 0);
    let response = call(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/files/{id}/analysis")),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn stalled_analyzer_times_out_into_error() {
    let harness = harness(Arc::new(StalledAnalyzer), Duration::from_millis(20));
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload(&app, &cookie).await;

    assert_eq!(trigger(&app, &cookie, id).await.status(), StatusCode::ACCEPTED);
    harness.registry.wait_idle().await;

    assert_eq!(record_json(&app, &cookie, id).await["status"], "error");
}

#[actix_web::test]
async fn concurrent_trigger_is_a_conflict() {
    let analyzer = GatedAnalyzer::new();
    let harness = harness(analyzer.clone(), DEFAULT_ANALYSIS_TIMEOUT);
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload(&app, &cookie).await;

    assert_eq!(trigger(&app, &cookie, id).await.status(), StatusCode::ACCEPTED);
    analyzer.wait_entered().await;
    assert_eq!(record_json(&app, &cookie, id).await["status"], "processing");

    let second = trigger(&app, &cookie, id).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(second).await;
    assert_eq!(body["code"], "conflict");

    analyzer.release();
    harness.registry.wait_idle().await;
    assert_eq!(analyzer.calls(), 1);
    assert_eq!(record_json(&app, &cookie, id).await["status"], "completed");
}

#[actix_web::test]
async fn completed_record_cannot_be_reanalysed() {
    let harness = harness(
        Arc::new(ScriptedAnalyzer::succeeding(sample_report(55))),
        DEFAULT_ANALYSIS_TIMEOUT,
    );
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload(&app, &cookie).await;

    assert_eq!(trigger(&app, &cookie, id).await.status(), StatusCode::ACCEPTED);
    harness.registry.wait_idle().await;

    let again = trigger(&app, &cookie, id).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(again).await;
    assert_eq!(body["details"]["status"], "completed");
    assert_eq!(harness.store.analysis_count(), 1);
}

#[actix_web::test]
async fn deleting_during_processing_cancels_analysis() {
    let analyzer = GatedAnalyzer::new();
    let harness = harness(analyzer.clone(), DEFAULT_ANALYSIS_TIMEOUT);
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login_cookie(&app).await;
    let id = upload(&app, &cookie).await;

    assert_eq!(trigger(&app, &cookie, id).await.status(), StatusCode::ACCEPTED);
    analyzer.wait_entered().await;

    let deleted = call(
        &app,
        actix_test::TestRequest::delete().uri(&format!("/api/files/{id}")),
        &cookie,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    harness.registry.wait_idle().await;
    assert_eq!(harness.store.record_count(), 0);
    assert_eq!(harness.store.analysis_count(), 0);
    let response = call(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/files/{id}")),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
