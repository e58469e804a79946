/// Stored photo serving
use crate::{
    context::AppContext,
    error::{GalleryError, GalleryResult},
    gallery::PhotoManager,
};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/media/*key", get(get_media))
}

/// Serve a stored object by key
async fn get_media(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> GalleryResult<Response> {
    let data = ctx
        .blobs
        .get(&key)
        .await?
        .ok_or_else(|| GalleryError::NotFound(format!("Media not found: {}", key)))?;

    let content_type = PhotoManager::detect_content_type(&data);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "private, max-age=86400".to_string()),
        ],
        data,
    )
        .into_response())
}
