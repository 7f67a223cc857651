//! HTTP router construction.

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router: `/` serves the query, everything else is 404.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(api::flights))
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
