use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;

use crate::infra::app_state::AppState;

pub async fn root_handler() -> &'static str {
    "Hello, World!"
}

/// Liveness plus a check of the metadata store.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.images.image_count().await {
        Ok(images) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "images": images,
            })),
        ),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "version": env!("CARGO_PKG_VERSION"),
                    "error": e.to_string(),
                })),
            )
        }
    }
}
