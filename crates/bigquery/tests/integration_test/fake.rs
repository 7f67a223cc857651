//! In-process stand-in for the GCE metadata server and BigQuery v2 REST API.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const FAKE_TOKEN: &str = "ya29.fake-token";
pub const FAKE_PROJECT: &str = "fake-project";

#[derive(Clone, Default)]
pub struct Recorded {
    /// (project, body) of every accepted `jobs.query` call.
    pub queries: Arc<Mutex<Vec<(String, Value)>>>,
}

pub struct FakeGoogle {
    pub base_url: String,
    pub recorded: Recorded,
}

impl FakeGoogle {
    pub fn metadata_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn api_url(&self) -> String {
        format!("{}/bigquery/v2", self.base_url)
    }

    pub fn query_count(&self) -> usize {
        self.recorded.queries.lock().unwrap().len()
    }
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": message, "status": "ERROR"}})),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {FAKE_TOKEN}"))
        .unwrap_or(false)
}

async fn token(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("metadata-flavor").and_then(|v| v.to_str().ok()) != Some("Google") {
        return api_error(StatusCode::FORBIDDEN, "Missing Metadata-Flavor header");
    }
    (
        StatusCode::OK,
        Json(json!({"access_token": FAKE_TOKEN, "expires_in": 3599, "token_type": "Bearer"})),
    )
}

async fn project_id(headers: HeaderMap) -> (StatusCode, String) {
    if headers.get("metadata-flavor").and_then(|v| v.to_str().ok()) != Some("Google") {
        return (StatusCode::FORBIDDEN, String::new());
    }
    (StatusCode::OK, FAKE_PROJECT.to_string())
}

async fn query(
    State(recorded): State<Recorded>,
    Path(project): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Request had invalid authentication credentials.");
    }

    let sql = body["query"].as_str().unwrap_or_default().to_string();
    recorded.queries.lock().unwrap().push((project.clone(), body));

    if sql.contains("FAIL") {
        return api_error(StatusCode::BAD_REQUEST, "Syntax error: Unexpected identifier \"FAIL\"");
    }
    if sql.contains("PENDING") {
        return (
            StatusCode::OK,
            Json(json!({
                "kind": "bigquery#queryResponse",
                "jobReference": {"projectId": project, "jobId": "job_pending"},
                "jobComplete": false
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "kind": "bigquery#queryResponse",
            "schema": {"fields": [
                {"name": "departurestation", "type": "STRING", "mode": "NULLABLE"},
                {"name": "arrivalstation", "type": "STRING", "mode": "NULLABLE"},
                {"name": "number_of_flights", "type": "INTEGER", "mode": "NULLABLE"}
            ]},
            "jobReference": {"projectId": project, "jobId": "job_ok", "location": "US"},
            "totalRows": "3",
            "rows": [
                {"f": [{"v": "JFK"}, {"v": "LAX"}, {"v": "42"}]},
                {"f": [{"v": "SFO"}, {"v": "SEA"}, {"v": "17"}]},
                {"f": [{"v": "BOS"}, {"v": null}, {"v": "3"}]}
            ],
            "totalBytesProcessed": "2048",
            "jobComplete": true,
            "cacheHit": false
        })),
    )
}

async fn datasets(Path(project): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Request had invalid authentication credentials.");
    }
    (
        StatusCode::OK,
        Json(json!({
            "kind": "bigquery#datasetList",
            "datasets": [
                {"id": format!("{project}:flight_data"), "datasetReference": {"projectId": project, "datasetId": "flight_data"}},
                {"id": format!("{project}:scratch"), "datasetReference": {"projectId": project, "datasetId": "scratch"}}
            ]
        })),
    )
}

/// Bind on an ephemeral port and serve until the test runtime shuts down.
pub async fn start() -> FakeGoogle {
    let recorded = Recorded::default();

    let app = Router::new()
        .route("/computeMetadata/v1/instance/service-accounts/default/token", get(token))
        .route("/computeMetadata/v1/project/project-id", get(project_id))
        .route("/bigquery/v2/projects/{project}/queries", post(query))
        .route("/bigquery/v2/projects/{project}/datasets", get(datasets))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeGoogle {
        base_url: format!("http://{addr}"),
        recorded,
    }
}
