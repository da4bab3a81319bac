pub mod content;
pub mod error;

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub use error::ApiError;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
