//! Runs the configured query under the deployment's ambient identity.

use std::sync::Arc;

use tracing::{debug, info};

use skyquery_core::BigQueryConfig;

use crate::client::QueryService;
use crate::credentials::{AccessToken, CredentialProvider, BIGQUERY_SCOPE};
use crate::error::BigQueryError;
use crate::result::{QueryRequest, ShapedResult};
use crate::shape::shape;

/// Per-request query pipeline: credentials → `jobs.query` → shaper.
///
/// Holds no mutable state; one instance is shared by every request.
#[derive(Clone)]
pub struct QueryExecutor {
    credentials: Arc<dyn CredentialProvider>,
    service: Arc<dyn QueryService>,
    config: BigQueryConfig,
}

impl QueryExecutor {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        service: Arc<dyn QueryService>,
        config: BigQueryConfig,
    ) -> Self {
        Self {
            credentials,
            service,
            config,
        }
    }

    pub fn config(&self) -> &BigQueryConfig {
        &self.config
    }

    /// Token plus billing project. Any failure here is a credential error.
    async fn authorize(&self) -> Result<(AccessToken, String), BigQueryError> {
        let token = self.credentials.access_token(BIGQUERY_SCOPE).await?;
        let project_id = self.credentials.project_id().await?;
        Ok((token, project_id))
    }

    /// Run the configured query and return its shaped rows.
    ///
    /// A response without a schema or without rows is an empty result,
    /// not an error.
    pub async fn fetch_rows(&self) -> Result<ShapedResult, BigQueryError> {
        let (token, project_id) = self.authorize().await?;

        let request = QueryRequest {
            query: self.config.query.clone(),
            use_legacy_sql: self.config.use_legacy_sql,
        };

        let response = self.service.query(&token, &project_id, &request).await?;

        debug!(
            project_id = %project_id,
            job_id = response.job_reference.as_ref().map(|j| j.job_id.as_str()).unwrap_or(""),
            job_complete = response.job_complete,
            total_rows = response.total_rows.as_deref().unwrap_or("0"),
            bytes_processed = response.total_bytes_processed.as_deref().unwrap_or("0"),
            "Query response received"
        );

        let result = shape(response.schema.as_ref(), response.rows.as_deref()).unwrap_or_default();

        info!(
            project_id = %project_id,
            rows = result.row_count(),
            columns = result.column_count(),
            "Query complete"
        );

        Ok(result)
    }

    /// IDs of every dataset visible to the ambient project.
    pub async fn datasets(&self) -> Result<Vec<String>, BigQueryError> {
        let (token, project_id) = self.authorize().await?;

        let list = self
            .service
            .list_datasets(&token, &project_id)
            .await
            .map_err(|e| BigQueryError::ListDatasets {
                project: project_id.clone(),
                reason: e.to_string(),
            })?;

        Ok(list.datasets.into_iter().map(|d| d.id).collect())
    }
}
