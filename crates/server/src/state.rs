use std::sync::Arc;

use skyquery_bigquery::{credentials, BigQueryClient, QueryExecutor};
use skyquery_core::Config;

/// Process-wide, read-only request context.
pub struct AppState {
    pub executor: QueryExecutor,
}

impl AppState {
    /// Wire the ambient credential provider and REST client from config.
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let credentials = credentials::from_config(&config.gcp, http.clone());
        let service = Arc::new(BigQueryClient::new(http, config.bigquery.api_url.clone()));

        Self {
            executor: QueryExecutor::new(credentials, service, config.bigquery.clone()),
        }
    }
}
