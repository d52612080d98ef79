use assert_matches::assert_matches;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, header, query_param, body_json};

use doctor_cell::{DoctorError, DoctorRecord, DoctorStore, SupabaseDoctorStore, Weekday};
use shared_utils::test_utils::{MockDoctorDocuments, TestConfig};

async fn store_for(server: &MockServer) -> SupabaseDoctorStore {
    SupabaseDoctorStore::new(&TestConfig::with_mock_server(&server.uri()).to_app_config())
}

#[tokio::test]
async fn test_find_by_specialization_uses_ilike_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("primary_specialization", "ilike.%Cardiology%"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(MockDoctorDocuments::cardiology_panel())))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let doctors = store.find_by_specialization("Cardiology").await.unwrap();

    assert_eq!(doctors.len(), 7);
    assert_eq!(doctors[1].doctor_id, "D0024");
    assert!(doctors[1].weekly_schedule.has_slot(Weekday::Monday, "10:00"));
}

#[tokio::test]
async fn test_find_by_id_missing_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("doctor_id", "eq.D0999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert!(store.find_by_id("D0999").await.unwrap().is_none());
}

#[tokio::test]
async fn test_pull_slot_calls_rpc_and_reports_modified_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_schedule_slot"))
        .and(body_json(json!({ "p_doctor_id": "D0024", "p_day": "Monday", "p_time": "10:00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_schedule_slot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(0)))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert_eq!(store.pull_slot("D0024", Weekday::Monday, "10:00").await.unwrap(), 1);
    assert_eq!(store.pull_slot("D0024", Weekday::Monday, "10:00").await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_failure_is_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert_matches!(store.find_by_specialization("ENT").await, Err(DoctorError::Store(_)));
}

#[tokio::test]
async fn test_insert_many_returns_ids_and_maps_conflict() {
    let server = MockServer::start().await;
    let documents = MockDoctorDocuments::cardiology_panel();

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(documents)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key value"))
        .mount(&server)
        .await;

    let records: Vec<DoctorRecord> = documents
        .into_iter()
        .map(|doc| serde_json::from_value(doc).unwrap())
        .collect();

    let store = store_for(&server).await;
    let ids = store.insert_many(records.clone()).await.unwrap();
    assert_eq!(ids.len(), 7);
    assert_eq!(ids[1], "D0024");

    assert_matches!(store.insert_many(records).await, Err(DoctorError::DuplicateId(_)));
}
