/// Errors that can occur while talking to BigQuery.
///
/// `Credential` covers everything up to holding a usable token and project.
/// Every other variant is a failure of the query service call itself.
#[derive(Debug, thiserror::Error)]
pub enum BigQueryError {
    /// The ambient credential provider could not produce a client.
    #[error("could not create http client: {0}")]
    Credential(String),

    /// The service answered with a non-success status.
    #[error("query service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("query request failed: {0}")]
    Transport(String),

    /// The response body was not the JSON shape we expect.
    #[error("could not decode query response: {0}")]
    Decode(String),

    /// Dataset listing failed for the given project.
    #[error("could not list datasets for {project:?}: {reason}")]
    ListDatasets { project: String, reason: String },
}

impl BigQueryError {
    /// Returns `true` when no query was ever submitted.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential(_))
    }
}
