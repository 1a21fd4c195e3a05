use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use photoalbum_core::UploadFile;
use photoalbum_model::{
    FavouriteUpdateResponse, Image, ImageID, MessageResponse, Page,
    UpdateFavouriteRequest, UpdateImageAlbumsRequest,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::infra::{
    app_state::AppState,
    errors::{ApiJson, AppError, AppResult},
};

/// Multipart field names that carry image files.
pub const UPLOAD_FIELDS: [&str; 3] = ["images", "file", "files"];

#[derive(Debug, Default, Deserialize)]
pub struct ListImagesQuery {
    pub page: Option<String>,
    #[serde(alias = "isFavourite")]
    pub favourite: Option<String>,
    #[serde(alias = "favPage")]
    pub favpage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlbumImagesQuery {
    pub page: Option<String>,
    pub last: Option<String>,
}

fn is_true(flag: Option<&str>) -> bool {
    flag.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// List images, newest first
///
/// `?page=N` pages through every image. With `?favourite=true` only
/// favourites are listed and `?favpage=N` selects the page instead.
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ListImagesQuery>,
) -> AppResult<Json<Page<Image>>> {
    let page = if is_true(query.favourite.as_deref()) {
        let request = state.images.page_request(query.favpage.as_deref());
        state.images.list_favourites(request).await?
    } else {
        let request = state.images.page_request(query.page.as_deref());
        state.images.list_images(request).await?
    };
    Ok(Json(page))
}

/// Upload up to the policy maximum of image files in one multipart request.
///
/// Responds `201 Created` with the first page of all images.
pub async fn upload_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Page<Image>>)> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if !UPLOAD_FIELDS.contains(&name.as_str()) {
            debug!(field = %name, "ignoring multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        files.push(UploadFile::new(file_name, content_type, bytes.to_vec()));
    }

    info!(count = files.len(), "received upload request");
    let page = state.images.upload_images(files).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// Page through an album, or fetch its latest image with `?last=true`.
pub async fn list_album_images(
    State(state): State<AppState>,
    Path(album): Path<String>,
    Query(query): Query<AlbumImagesQuery>,
) -> AppResult<Response> {
    if is_true(query.last.as_deref()) {
        let cover = state.images.album_cover(&album).await?;
        return Ok(Json(cover).into_response());
    }

    let request = state.images.page_request(query.page.as_deref());
    let page = state.images.list_album_images(&album, request).await?;
    Ok(Json(page).into_response())
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id: ImageID = id.parse()?;
    state.images.delete_image(id).await?;
    Ok(Json(MessageResponse::new("Image deleted successfully")))
}

/// Mark or unmark a favourite. Responds with every image and the new
/// favourite count.
pub async fn update_favourite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateFavouriteRequest>,
) -> AppResult<Json<FavouriteUpdateResponse>> {
    let id: ImageID = id.parse()?;
    let response = state.images.set_favourite(id, request.is_favourite).await?;
    Ok(Json(response))
}

/// Add the image to `albums`, or remove it from `albumName`.
pub async fn update_image_albums(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateImageAlbumsRequest>,
) -> AppResult<Response> {
    let id: ImageID = id.parse()?;

    match request {
        UpdateImageAlbumsRequest {
            albums: Some(albums),
            ..
        } => {
            state.images.add_to_albums(id, &albums).await?;
            Ok(Json(MessageResponse::new("Image added to album successfully")).into_response())
        }
        UpdateImageAlbumsRequest {
            album_name: Some(album),
            ..
        } => {
            let image = state.images.remove_from_album(id, &album).await?;
            Ok(Json(image).into_response())
        }
        _ => Err(AppError::bad_request(
            "Either albums or albumName is required",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favourite_flag_accepts_only_true() {
        assert!(is_true(Some("true")));
        assert!(is_true(Some(" TRUE ")));
        assert!(!is_true(Some("false")));
        assert!(!is_true(Some("1")));
        assert!(!is_true(None));
    }
}
