use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, upload};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
///
/// `max_upload_bytes` bounds the request body accepted by `POST /upload`.
pub fn create_api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route(
            "/upload",
            post(upload::upload_audio).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .layer(TraceLayer::new_for_http())
}
