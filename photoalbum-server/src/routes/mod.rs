use axum::{
    Router,
    routing::{delete, get, put},
};

use crate::{
    handlers::{albums, images},
    infra::app_state::AppState,
};

/// Routes served under `/api`.
///
/// `/images/{key}` takes an album name for `GET` and an image id for the
/// other methods.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/images", get(images::list_images).post(images::upload_images))
        .route(
            "/images/{key}",
            get(images::list_album_images)
                .delete(images::delete_image)
                .put(images::update_favourite)
                .patch(images::update_favourite),
        )
        .route(
            "/images/{key}/favourite",
            put(images::update_favourite).patch(images::update_favourite),
        )
        .route(
            "/images/{key}/albums",
            put(images::update_image_albums).patch(images::update_image_albums),
        )
        .route("/albums", get(albums::list_albums).post(albums::create_album))
        .route("/albums/{name}", delete(albums::delete_album))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use photoalbum_core::InMemoryMediaHost;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let state = AppState::in_memory(
            Arc::new(InMemoryMediaHost::default()),
            Config::default(),
        );
        create_api_router().with_state(state)
    }

    #[tokio::test]
    async fn empty_listing_is_served() {
        let response = router()
            .oneshot(Request::builder().uri("/images").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = router()
            .oneshot(Request::builder().uri("/videos").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn album_delete_requires_existing_album() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/albums/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
