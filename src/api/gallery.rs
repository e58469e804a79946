/// Guest-facing gallery endpoints
use crate::{
    context::AppContext,
    error::GalleryResult,
    gallery::{Chapter, GallerySummary, NewPasswordRequest, Photo, RequestStatus},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/galleries/:code/unlock", post(unlock_gallery))
        .route("/api/galleries/:code/password-requests", post(request_password))
}

#[derive(Debug, Deserialize)]
struct UnlockRequest {
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnlockedGallery {
    gallery: GallerySummary,
    chapters: Vec<Chapter>,
    photos: Vec<Photo>,
}

/// Open a gallery with its code and password
async fn unlock_gallery(
    State(ctx): State<AppContext>,
    Path(code): Path<String>,
    Json(req): Json<UnlockRequest>,
) -> GalleryResult<Json<UnlockedGallery>> {
    let gallery = ctx.galleries.verify_access(&code, &req.password).await?;
    let chapters = ctx.chapters.list(&gallery.id).await?;
    let photos = ctx.photos.list_photos(&gallery.id).await?;

    Ok(Json(UnlockedGallery {
        gallery: GallerySummary::from(&gallery),
        chapters,
        photos,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequestReceipt {
    id: String,
    status: RequestStatus,
}

/// Ask the couple for a gallery's password
async fn request_password(
    State(ctx): State<AppContext>,
    Path(code): Path<String>,
    Json(req): Json<NewPasswordRequest>,
) -> GalleryResult<(StatusCode, Json<PasswordRequestReceipt>)> {
    let request = ctx.password_requests.create(&code, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(PasswordRequestReceipt {
            id: request.id,
            status: request.status,
        }),
    ))
}
