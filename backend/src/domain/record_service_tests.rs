//! Tests for the record service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    AnalysisRepositoryError, MockAnalysisRepository, MockRecordRepository, RecordRepositoryError,
};
use crate::domain::{
    AnalysisId, ErrorCode, NewAnalysis, RecordStatus, UploadPolicy, UploadedDocument,
};
use crate::outbound::memory::InMemoryFinancialStore;
use crate::test_support::analysis::{FixtureClock, sample_report};

fn owner() -> OwnerId {
    OwnerId::new("123e4567-e89b-12d3-a456-426614174000").expect("valid owner")
}

fn stranger() -> OwnerId {
    OwnerId::new("9b2f1c4e-0d7a-4a5e-8f3b-2c6d9e1a7b50").expect("valid owner")
}

fn document(name: &str, body: &[u8]) -> UploadedDocument {
    UploadedDocument::from_bytes(name, None, body, &UploadPolicy::default()).expect("valid upload")
}

fn stored_record(id: i64, owner: OwnerId) -> Record {
    NewRecord {
        owner,
        file_name: "q1.csv".to_owned(),
        file_type: "text/csv".to_owned(),
        upload_date: FixtureClock::default().0,
        content: Some("a,b".to_owned()),
        file_url: None,
    }
    .into_record(RecordId::new(id))
}

type MemoryService = RecordService<InMemoryFinancialStore, InMemoryFinancialStore>;

fn memory_service() -> (MemoryService, Arc<InMemoryFinancialStore>, Arc<AnalysisRegistry>) {
    let store = Arc::new(InMemoryFinancialStore::new());
    let registry = Arc::new(AnalysisRegistry::new());
    let service = RecordService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&registry),
        Arc::new(FixtureClock::default()),
    );
    (service, store, registry)
}

fn mock_service(
    records: MockRecordRepository,
    analyses: MockAnalysisRepository,
) -> RecordService<MockRecordRepository, MockAnalysisRepository> {
    RecordService::new(
        Arc::new(records),
        Arc::new(analyses),
        Arc::new(AnalysisRegistry::new()),
        Arc::new(FixtureClock::default()),
    )
}

fn upload_request(doc: UploadedDocument) -> UploadRecordRequest {
    UploadRecordRequest {
        owner: owner(),
        document: doc,
        file_url: None,
    }
}

#[tokio::test]
async fn upload_stores_pending_record_with_clock_timestamp() {
    let (service, store, _) = memory_service();

    let record = service
        .upload(upload_request(document("q1.csv", b"month,revenue\nJan,100")))
        .await
        .expect("upload succeeds");

    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.file_name, "q1.csv");
    assert_eq!(record.file_type, "text/csv");
    assert_eq!(record.upload_date, FixtureClock::default().0);
    assert_eq!(record.content.as_deref(), Some("month,revenue\nJan,100"));
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn list_only_returns_callers_records() {
    let (service, _, _) = memory_service();
    service
        .upload(upload_request(document("mine.csv", b"a")))
        .await
        .expect("upload");
    service
        .upload(UploadRecordRequest {
            owner: stranger(),
            document: document("theirs.csv", b"b"),
            file_url: None,
        })
        .await
        .expect("upload");

    let listed = service.list(&owner()).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].record.file_name, "mine.csv");
    assert!(listed[0].analysis.is_none());
}

#[tokio::test]
async fn get_hides_foreign_records() {
    let (service, _, _) = memory_service();
    let record = service
        .upload(upload_request(document("q1.csv", b"a")))
        .await
        .expect("upload");

    assert_eq!(
        service.get(&owner(), record.id).await.expect("own record").id,
        record.id
    );
    let err = service
        .get(&stranger(), record.id)
        .await
        .expect_err("foreign record");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn latest_analysis_reports_missing_analysis_as_not_found() {
    let (service, _, _) = memory_service();
    let record = service
        .upload(upload_request(document("q1.csv", b"a")))
        .await
        .expect("upload");

    let err = service
        .latest_analysis(&owner(), record.id)
        .await
        .expect_err("no analysis yet");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Analysis not found");
    assert_eq!(
        err.details().and_then(|d| d.get("status")).and_then(|s| s.as_str()),
        Some("pending")
    );
}

#[tokio::test]
async fn latest_analysis_returns_newest_result() {
    let (service, store, _) = memory_service();
    let record = service
        .upload(upload_request(document("q1.csv", b"a")))
        .await
        .expect("upload");
    let created = AnalysisRepository::create(
        store.as_ref(),
        NewAnalysis {
            record_id: record.id,
            created_at: FixtureClock::default().0,
            report: sample_report(71),
        },
    )
    .await
    .expect("analysis stored");

    let latest = service
        .latest_analysis(&owner(), record.id)
        .await
        .expect("analysis");
    assert_eq!(latest.id, created.id);
    assert_eq!(latest.report.health_score.get(), 71);
}

#[tokio::test]
async fn delete_removes_record_and_cancels_running_analysis() {
    let (service, store, registry) = memory_service();
    let record = service
        .upload(upload_request(document("q1.csv", b"a")))
        .await
        .expect("upload");
    let claim = registry.try_claim(record.id).expect("claim");

    service.delete(&owner(), record.id).await.expect("delete");

    assert!(claim.token().is_cancelled());
    assert_eq!(store.record_count(), 0);
    let err = service
        .get(&owner(), record.id)
        .await
        .expect_err("deleted");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_of_foreign_record_is_not_found_and_keeps_it() {
    let (service, store, _) = memory_service();
    let record = service
        .upload(upload_request(document("q1.csv", b"a")))
        .await
        .expect("upload");

    let err = service
        .delete(&stranger(), record.id)
        .await
        .expect_err("foreign delete");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn delete_race_reports_not_found() {
    let mut records = MockRecordRepository::new();
    let existing = stored_record(5, owner());
    records
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    records.expect_delete().times(1).return_once(|_| Ok(false));

    let service = mock_service(records, MockAnalysisRepository::new());
    let err = service
        .delete(&owner(), RecordId::new(5))
        .await
        .expect_err("already gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn upload_maps_connection_failures_to_service_unavailable() {
    let mut records = MockRecordRepository::new();
    records
        .expect_create()
        .times(1)
        .return_once(|_| Err(RecordRepositoryError::connection("pool exhausted")));

    let service = mock_service(records, MockAnalysisRepository::new());
    let err = service
        .upload(upload_request(document("q1.csv", b"a")))
        .await
        .expect_err("connection failure");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn analysis_query_failures_map_to_internal_error() {
    let mut records = MockRecordRepository::new();
    let existing = stored_record(8, owner());
    records
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    let mut analyses = MockAnalysisRepository::new();
    analyses
        .expect_latest_for_record()
        .times(1)
        .return_once(|_| Err(AnalysisRepositoryError::query("bad column")));

    let service = mock_service(records, analyses);
    let err = service
        .latest_analysis(&owner(), RecordId::new(8))
        .await
        .expect_err("query failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn analysis_ids_are_exposed_from_repository() {
    let mut records = MockRecordRepository::new();
    let existing = stored_record(3, owner());
    records
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    let mut analyses = MockAnalysisRepository::new();
    analyses.expect_latest_for_record().times(1).return_once(|id| {
        Ok(Some(
            NewAnalysis {
                record_id: id,
                created_at: FixtureClock::default().0,
                report: sample_report(12),
            }
            .into_analysis(AnalysisId::new(44)),
        ))
    });

    let service = mock_service(records, analyses);
    let analysis = service
        .latest_analysis(&owner(), RecordId::new(3))
        .await
        .expect("analysis");
    assert_eq!(analysis.id, AnalysisId::new(44));
    assert_eq!(analysis.record_id, RecordId::new(3));
}
