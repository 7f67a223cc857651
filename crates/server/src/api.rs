//! Root handler and plain-text response writer.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use skyquery_bigquery::ShapedRow;

use crate::state::AppState;

/// One `Display` rendering per row, newline-terminated, in result order.
pub fn render_rows(rows: &[ShapedRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.to_string());
        out.push('\n');
    }
    out
}

/// `/`: run the query and dump its rows, or the error text on failure.
pub async fn flights(State(state): State<Arc<AppState>>) -> String {
    let result = match state.executor.fetch_rows().await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, credential = e.is_credential(), "Query failed");
            return e.to_string();
        }
    };

    render_rows(&result.rows)
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found\n")
}
