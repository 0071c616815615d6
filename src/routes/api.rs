use axum::{Router, extract::DefaultBodyLimit, routing::post};
use tower_http::trace::TraceLayer;

use crate::handlers::converse;
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router for the conversation endpoint
///
/// `max_upload_bytes` caps the multipart body; larger uploads are rejected as
/// invalid requests.
pub fn create_api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api", post(converse::converse_handler))
        .route("/converse", post(converse::converse_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
