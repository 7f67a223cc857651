//! End-to-end QueryExecutor runs: metadata credentials + REST client + shaper.

use std::sync::Arc;

use serde_json::json;
use skyquery_bigquery::*;
use skyquery_core::BigQueryConfig;

use crate::fake::{self, FakeGoogle, FAKE_PROJECT};

fn executor(google: &FakeGoogle, query: &str) -> QueryExecutor {
    let http = reqwest::Client::new();
    QueryExecutor::new(
        Arc::new(MetadataServerCredentials::new(http.clone(), google.metadata_url(), None)),
        Arc::new(BigQueryClient::new(http, google.api_url())),
        BigQueryConfig {
            api_url: google.api_url(),
            query: query.to_string(),
            use_legacy_sql: false,
        },
    )
}

#[tokio::test]
async fn fetch_rows_end_to_end() {
    let google = fake::start().await;

    let result = executor(&google, "SELECT flights").fetch_rows().await.unwrap();

    assert_eq!(
        result.headers,
        vec!["departurestation", "arrivalstation", "number_of_flights"]
    );
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.rows[0], ShapedRow(vec![json!("JFK"), json!("LAX"), json!("42")]));
    assert_eq!(result.rows[2].to_string(), "[BOS NULL 3]");

    let recorded = google.recorded.queries.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, FAKE_PROJECT);
}

#[tokio::test]
async fn pending_job_yields_empty_result() {
    let google = fake::start().await;

    let result = executor(&google, "SELECT PENDING").fetch_rows().await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn failing_query_is_reported() {
    let google = fake::start().await;

    let err = executor(&google, "SELECT FAIL").fetch_rows().await.unwrap_err();

    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("Syntax error"));
}

#[tokio::test]
async fn missing_metadata_server_submits_nothing() {
    let google = fake::start().await;
    let http = reqwest::Client::new();
    let executor = QueryExecutor::new(
        Arc::new(MetadataServerCredentials::new(http.clone(), "http://127.0.0.1:9", None)),
        Arc::new(BigQueryClient::new(http, google.api_url())),
        BigQueryConfig::default(),
    );

    let err = executor.fetch_rows().await.unwrap_err();

    assert!(err.is_credential());
    assert_eq!(google.query_count(), 0);
}

#[tokio::test]
async fn datasets_end_to_end() {
    let google = fake::start().await;

    let ids = executor(&google, "").datasets().await.unwrap();

    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| id.starts_with("fake-project:")));
}
