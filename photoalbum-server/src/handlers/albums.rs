use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use photoalbum_model::{Album, CreateAlbumRequest, MessageResponse};
use tracing::info;

use crate::infra::{
    app_state::AppState,
    errors::{ApiJson, AppResult},
};

pub async fn list_albums(State(state): State<AppState>) -> AppResult<Json<Vec<Album>>> {
    let albums = state.albums.list_albums().await?;
    Ok(Json(albums))
}

/// Create an album
///
/// Names are trimmed and lowercased and must be 3 to 20 characters long.
///
/// - `201 Created` with the stored album
/// - `400 Bad Request` for an invalid name
/// - `409 Conflict` if the album already exists
pub async fn create_album(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAlbumRequest>,
) -> AppResult<(StatusCode, Json<Album>)> {
    let album = state.albums.create_album(&request.name).await?;
    info!(album = %album.name, "created album");
    Ok((StatusCode::CREATED, Json(album)))
}

/// Delete an album and drop it from every image that referenced it.
pub async fn delete_album(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.albums.delete_album(&name).await?;
    Ok(Json(MessageResponse::new("Album deleted successfully")))
}
