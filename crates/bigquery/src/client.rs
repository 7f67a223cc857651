//! BigQuery v2 REST client.
//!
//! Provides the [`QueryService`] seam and [`BigQueryClient`], its `reqwest`
//! implementation. Only the two calls this service needs are covered:
//! `jobs.query` and `datasets.list`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::credentials::AccessToken;
use crate::error::BigQueryError;
use crate::result::{DatasetList, QueryRequest, QueryResponse};

/// The managed query service, as seen by the executor.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Run `request` synchronously in `project_id` (`jobs.query`).
    async fn query(
        &self,
        token: &AccessToken,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, BigQueryError>;

    /// List datasets visible in `project_id` (`datasets.list`, first page only).
    async fn list_datasets(
        &self,
        token: &AccessToken,
        project_id: &str,
    ) -> Result<DatasetList, BigQueryError>;
}

/// Google API error envelope: `{"error": {"code": 403, "message": "..."}}`.
#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Pull `error.message` out of a Google error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

pub struct BigQueryClient {
    http: reqwest::Client,
    api_url: String,
}

impl BigQueryClient {
    /// `api_url` is the REST root, e.g. `https://bigquery.googleapis.com/bigquery/v2`.
    pub fn new(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        info!(api_url = %api_url, "BigQueryClient initialised");
        Self { http, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Turn a response into `T`, mapping non-2xx statuses to [`BigQueryError::Api`].
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BigQueryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BigQueryError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BigQueryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QueryService for BigQueryClient {
    async fn query(
        &self,
        token: &AccessToken,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, BigQueryError> {
        let url = format!("{}/projects/{}/queries", self.api_url, project_id);
        debug!(project_id = %project_id, legacy_sql = request.use_legacy_sql, "Submitting query");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token.token)
            .json(request)
            .send()
            .await
            .map_err(|e| BigQueryError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    async fn list_datasets(
        &self,
        token: &AccessToken,
        project_id: &str,
    ) -> Result<DatasetList, BigQueryError> {
        let url = format!("{}/projects/{}/datasets", self.api_url, project_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token.token)
            .send()
            .await
            .map_err(|e| BigQueryError::Transport(e.to_string()))?;

        Self::decode(response).await
    }
}
