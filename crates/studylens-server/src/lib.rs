//! HTTP surface of the learning-material processor.
//!
//! Submissions return the pending record immediately; clients poll
//! `GET /api/content/:id` until the status is terminal.

pub mod api;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Room for the non-file multipart fields and boundaries.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/content", get(api::content::list_content))
        .route(
            "/api/content/document",
            post(api::content::submit_document).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/content/image",
            post(api::content::submit_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/content/video", post(api::content::submit_video))
        .route(
            "/api/content/:id",
            get(api::content::get_content).delete(api::content::delete_content),
        )
        .route("/api/content/:id/audio", get(api::content::get_audio))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
