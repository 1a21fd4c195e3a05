//! # Photo Album Server
//!
//! REST backend for a photo album. Images are uploaded to a managed media
//! host; the server keeps their metadata, favourites and album memberships
//! and serves paginated listings to the browser client.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::config::Config;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::health::{health_handler, root_handler};

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.images.policy().max_request_bytes();

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", routes::create_api_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(state.config()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Permissive in dev mode or with a wildcard, allow-list otherwise
fn cors_layer(config: &Config) -> CorsLayer {
    if config.dev_mode || config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}
