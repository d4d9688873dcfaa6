//! Integration tests for dataset loading using wiremock HTTP mocks.

use std::io::Write;

use centerdir_source::{
    load_dataset, load_store, DatasetClient, DatasetLocation, FetchOptions, SourceError,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(max_retries: u32) -> FetchOptions {
    FetchOptions {
        timeout_secs: 5,
        user_agent: "centerdir-test/1.0".to_owned(),
        max_retries,
        retry_backoff_ms: 0,
    }
}

fn sample_body() -> serde_json::Value {
    serde_json::json!({
        "data": [
            {"branch_code": "DL-01", "name": "Delhi", "region": "North",
             "state": "Delhi", "district": "New Delhi", "coords": ["28.6139", "77.2090"]},
            {"branch_code": "MH-01", "name": "Mumbai", "region": "West",
             "state": "Maharashtra", "district": "Mumbai", "coords": [19.076, 72.8777]},
            {"branch_code": "XX-01", "name": "Somewhere", "coords": null},
            {"name": "missing code"}
        ]
    })
}

#[tokio::test]
async fn fetch_dataset_parses_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/centers.json"))
        .and(header("user-agent", "centerdir-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&server)
        .await;

    let client = DatasetClient::new(&options(0)).expect("client");
    let dataset = client
        .fetch_dataset(&format!("{}/centers.json", server.uri()))
        .await
        .expect("dataset");

    assert_eq!(dataset.centers.len(), 3);
    assert_eq!(dataset.skipped, 1);
    assert_eq!(dataset.unlocated_count(), 1);
}

#[tokio::test]
async fn fetch_dataset_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/centers.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/centers.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&server)
        .await;

    let client = DatasetClient::new(&options(3)).expect("client");
    let dataset = client
        .fetch_dataset(&format!("{}/centers.json", server.uri()))
        .await
        .expect("should succeed after retries");
    assert_eq!(dataset.centers.len(), 3);
}

#[tokio::test]
async fn fetch_dataset_does_not_retry_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = DatasetClient::new(&options(3)).expect("client");
    let err = client
        .fetch_dataset(&format!("{}/missing.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SourceError::UnexpectedStatus { status: 404, .. }
    ));
}

#[tokio::test]
async fn fetch_dataset_rejects_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let client = DatasetClient::new(&options(0)).expect("client");
    let err = client
        .fetch_dataset(&format!("{}/centers.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Dataset(_)));
}

#[tokio::test]
async fn load_store_from_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&server)
        .await;

    let location = DatasetLocation::parse(&format!("{}/centers.json", server.uri()));
    let store = load_store(&location, &options(0)).await.expect("store");
    assert_eq!(store.len(), 3);
    assert_eq!(store.located_count(), 2);
    assert_eq!(store.get("dl-01").map(|c| c.name.as_str()), Some("Delhi"));
}

#[tokio::test]
async fn load_dataset_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "{}", sample_body()).expect("write");

    let location = DatasetLocation::Path(file.path().to_path_buf());
    let dataset = load_dataset(&location, &options(0)).await.expect("dataset");
    assert_eq!(dataset.centers.len(), 3);
}

#[tokio::test]
async fn load_dataset_missing_file_fails() {
    let location = DatasetLocation::parse("/no/such/centers.json");
    let err = load_dataset(&location, &options(0)).await.unwrap_err();
    assert!(matches!(err, SourceError::Dataset(_)));
}
