use std::env;

use serde::{Deserialize, Serialize};

/// Query served on `/` unless `BIGQUERY_QUERY` overrides it.
pub const DEFAULT_QUERY: &str = "SELECT departurestation, arrivalstation, count(*) AS number_of_flights
FROM `practical-argon-158218.flight_data.navitar`
GROUP BY departurestation, arrivalstation
ORDER BY number_of_flights DESC
LIMIT 100";

const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.as_str(), "true" | "1"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub gcp: GcpConfig,
    pub bigquery: BigQueryConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SKYQUERY_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SKYQUERY_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            gcp: GcpConfig::from_env_profiled(p),
            bigquery: BigQueryConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  gcp:         project={}, metadata={}, static_token={}",
            self.gcp.project_id.as_deref().unwrap_or("(ambient)"),
            self.gcp.metadata_host,
            self.gcp.access_token.is_some()
        );
        tracing::info!(
            "  bigquery:    api={}, legacy_sql={}",
            self.bigquery.api_url,
            self.bigquery.use_legacy_sql
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8080),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── GCP ambient identity ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    /// Explicit project; when unset the metadata server is asked.
    pub project_id: Option<String>,
    /// Host (optionally `host:port`) of the instance metadata server.
    pub metadata_host: String,
    /// Pre-issued OAuth token for running outside Google Cloud.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl GcpConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            project_id: profiled_env_opt(p, "GOOGLE_CLOUD_PROJECT"),
            metadata_host: profiled_env_or(p, "GCE_METADATA_HOST", DEFAULT_METADATA_HOST),
            access_token: profiled_env_opt(p, "BIGQUERY_ACCESS_TOKEN"),
        }
    }

    /// Base URL of the metadata server, e.g. `http://metadata.google.internal`.
    pub fn metadata_url(&self) -> String {
        if self.metadata_host.starts_with("http://") || self.metadata_host.starts_with("https://") {
            self.metadata_host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", self.metadata_host)
        }
    }
}

// ── BigQuery ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// REST base URL, without trailing slash.
    pub api_url: String,
    pub query: String,
    pub use_legacy_sql: bool,
}

impl BigQueryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_url: profiled_env_or(p, "BIGQUERY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            query: profiled_env_or(p, "BIGQUERY_QUERY", DEFAULT_QUERY),
            use_legacy_sql: profiled_env_bool(p, "BIGQUERY_USE_LEGACY_SQL", false),
        }
    }
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            use_legacy_sql: false,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
