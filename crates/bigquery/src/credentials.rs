//! Ambient credential providers.
//!
//! The executor never reads the environment itself: a [`CredentialProvider`]
//! is built once at startup and injected, so tests can swap in a fake.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use skyquery_core::GcpConfig;

use crate::error::BigQueryError;

/// OAuth scope granting BigQuery access.
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// A bearer token issued by the credential provider.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    /// Seconds until expiry, when the provider reports it.
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_in: None,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Source of the deployment's own identity.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Issue a token for `scope`.
    async fn access_token(&self, scope: &str) -> Result<AccessToken, BigQueryError>;

    /// The project the deployment runs as; also the billing project for queries.
    async fn project_id(&self) -> Result<String, BigQueryError>;
}

/// Build the provider matching `config`: a static token when one is
/// configured, otherwise the instance metadata server.
pub fn from_config(config: &GcpConfig, http: reqwest::Client) -> Arc<dyn CredentialProvider> {
    match (&config.access_token, &config.project_id) {
        (Some(token), Some(project)) => Arc::new(StaticCredentials::new(token.clone(), project.clone())),
        (Some(_), None) => {
            warn!("BIGQUERY_ACCESS_TOKEN ignored without GOOGLE_CLOUD_PROJECT; using metadata server");
            Arc::new(MetadataServerCredentials::new(http, config.metadata_url(), None))
        }
        _ => Arc::new(MetadataServerCredentials::new(
            http,
            config.metadata_url(),
            config.project_id.clone(),
        )),
    }
}

// ── Metadata server ──────────────────────────────────────────────

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Default service account of the hosting GCE / App Engine / Cloud Run instance.
pub struct MetadataServerCredentials {
    http: reqwest::Client,
    base_url: String,
    project_override: Option<String>,
}

impl MetadataServerCredentials {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, project_override: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            project_override,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, BigQueryError> {
        let url = format!("{}/computeMetadata/v1/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .query(query)
            .send()
            .await
            .map_err(|e| BigQueryError::Credential(format!("metadata server unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BigQueryError::Credential(format!(
                "metadata server returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl CredentialProvider for MetadataServerCredentials {
    async fn access_token(&self, scope: &str) -> Result<AccessToken, BigQueryError> {
        let token: MetadataToken = self
            .get("instance/service-accounts/default/token", &[("scopes", scope)])
            .await?
            .json()
            .await
            .map_err(|e| BigQueryError::Credential(format!("malformed token response: {e}")))?;

        debug!(expires_in = ?token.expires_in, "Obtained ambient access token");

        Ok(AccessToken {
            token: token.access_token,
            expires_in: token.expires_in,
        })
    }

    async fn project_id(&self) -> Result<String, BigQueryError> {
        if let Some(project) = &self.project_override {
            return Ok(project.clone());
        }

        let project = self
            .get("project/project-id", &[])
            .await?
            .text()
            .await
            .map_err(|e| BigQueryError::Credential(format!("malformed project id: {e}")))?;

        let project = project.trim();
        if project.is_empty() {
            return Err(BigQueryError::Credential("metadata server returned an empty project id".into()));
        }
        Ok(project.to_string())
    }
}

// ── Static token ─────────────────────────────────────────────────

/// A pre-issued token and explicit project, for running outside Google Cloud.
pub struct StaticCredentials {
    token: String,
    project_id: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn access_token(&self, _scope: &str) -> Result<AccessToken, BigQueryError> {
        Ok(AccessToken::new(self.token.clone()))
    }

    async fn project_id(&self) -> Result<String, BigQueryError> {
        Ok(self.project_id.clone())
    }
}
