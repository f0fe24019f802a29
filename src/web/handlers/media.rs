use crate::models::Media;
use crate::services::{media, ServiceError};
use crate::web::error::ApiResult;
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// POST /api/v1/uploads — multipart form; the first field carrying a
/// filename is taken as the upload.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Media>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(e.to_string()))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let media = media::store_upload(
            &state.db,
            &state.upload_dir,
            state.max_upload_bytes(),
            &original_name,
            &data,
            Some(user.user.id),
        )?;
        tracing::info!(filename = %media.filename, "file uploaded");
        return Ok((StatusCode::CREATED, Json(media)));
    }

    Err(ServiceError::Validation("no file selected".into()).into())
}

/// GET /api/v1/media/:filename
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let media =
        media::get_media_by_filename(&state.db, &filename)?.ok_or(ServiceError::NotFound)?;

    let path = state.upload_dir.join(&media.filename);
    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| ServiceError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, media.mime_type)], data).into_response())
}
