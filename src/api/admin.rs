/// Admin API endpoints
///
/// Gallery, photo, chapter and password-request management. Every handler
/// requires the admin bearer token via `AdminAuthContext`.
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    deletion::{DeletePhotoRequest, DeletionOutcome, Preconfirmed},
    error::{ErrorResponse, GalleryError, GalleryResult},
    gallery::{
        Chapter, ChapterUpdate, GallerySummary, GalleryUpdate, NewChapter, NewGallery, NewPhoto,
        PasswordRequest, Photo, RequestStatus,
    },
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        // Galleries
        .route("/api/admin/galleries", get(list_galleries).post(create_gallery))
        .route("/api/admin/galleries/:id", get(get_gallery).patch(update_gallery))
        // Photos
        .route("/api/admin/galleries/:id/photos", get(list_photos).post(upload_photo))
        .route("/api/admin/galleries/:id/photos/:photo_id", axum::routing::delete(delete_photo))
        .route("/api/admin/galleries/:id/photos/:photo_id/chapter", put(assign_chapter))
        // Chapters
        .route("/api/admin/galleries/:id/chapters", get(list_chapters).post(create_chapter))
        .route(
            "/api/admin/galleries/:id/chapters/:chapter_id",
            put(update_chapter).delete(delete_chapter),
        )
        // Password requests
        .route("/api/admin/password-requests", get(list_password_requests))
        .route("/api/admin/password-requests/:id/status", post(set_password_request_status))
}

// ============================================================================
// Galleries
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListGalleriesQuery {
    q: Option<String>,
}

async fn list_galleries(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Query(query): Query<ListGalleriesQuery>,
) -> GalleryResult<Json<Vec<GallerySummary>>> {
    let galleries = ctx.galleries.list(query.q.as_deref()).await?;
    Ok(Json(galleries.iter().map(GallerySummary::from).collect()))
}

async fn create_gallery(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<NewGallery>,
) -> GalleryResult<(StatusCode, Json<GallerySummary>)> {
    let gallery = ctx.galleries.create(req).await?;
    Ok((StatusCode::CREATED, Json(GallerySummary::from(&gallery))))
}

async fn get_gallery(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(gallery_id): Path<String>,
) -> GalleryResult<Json<GallerySummary>> {
    let gallery = ctx.galleries.get(&gallery_id).await?;
    Ok(Json(GallerySummary::from(&gallery)))
}

async fn update_gallery(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(gallery_id): Path<String>,
    Json(req): Json<GalleryUpdate>,
) -> GalleryResult<Json<GallerySummary>> {
    let gallery = ctx.galleries.update(&gallery_id, req).await?;
    Ok(Json(GallerySummary::from(&gallery)))
}

// ============================================================================
// Photos
// ============================================================================

async fn list_photos(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(gallery_id): Path<String>,
) -> GalleryResult<Json<Vec<Photo>>> {
    ctx.galleries.get(&gallery_id).await?;
    Ok(Json(ctx.photos.list_photos(&gallery_id).await?))
}

#[derive(Debug, Deserialize)]
struct UploadPhotoQuery {
    name: String,
}

/// Upload a photo
///
/// Accepts raw binary data in the request body with an optional
/// Content-Type header; the photo name comes from `?name=`.
async fn upload_photo(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(gallery_id): Path<String>,
    Query(query): Query<UploadPhotoQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> GalleryResult<(StatusCode, Json<Photo>)> {
    if body.is_empty() {
        return Err(GalleryError::Validation("Empty upload".to_string()));
    }
    if body.len() > ctx.config.service.max_upload_bytes {
        return Err(GalleryError::Validation(format!(
            "Upload exceeds {} bytes",
            ctx.config.service.max_upload_bytes
        )));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| *ct != "application/octet-stream")
        .map(String::from);

    let photo = ctx
        .photos
        .add_photo(
            &gallery_id,
            NewPhoto {
                name: query.name,
                data: body.to_vec(),
                content_type,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(photo)))
}

#[derive(Debug, Deserialize)]
struct DeletePhotoQuery {
    name: Option<String>,
    #[serde(default)]
    confirm: bool,
}

/// Delete a photo through the deletion workflow
///
/// Without `confirm=true` nothing is deleted and the confirmation prompt is
/// returned with 428 Precondition Required.
async fn delete_photo(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path((gallery_id, photo_id)): Path<(String, String)>,
    Query(query): Query<DeletePhotoQuery>,
) -> GalleryResult<Response> {
    let photo_name = match query.name.filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => ctx.photos.get_photo(&gallery_id, &photo_id).await?.name,
    };
    let request = DeletePhotoRequest::new(gallery_id.clone(), photo_id, photo_name);

    let galleries = ctx.galleries.clone();
    let on_deleted = move |deleted_id: String| async move {
        match galleries.refresh_photo_count(&gallery_id).await {
            Ok(count) => tracing::debug!(
                photo_id = %deleted_id,
                photo_count = count,
                "Refreshed gallery photo count"
            ),
            Err(e) => tracing::warn!(
                gallery_id = %gallery_id,
                error = %e,
                "Failed to refresh gallery photo count"
            ),
        }
    };

    let confirmer = Preconfirmed(query.confirm);
    match ctx
        .deletion
        .delete_photo(&request, &confirmer, on_deleted)
        .await?
    {
        DeletionOutcome::Deleted(report) => Ok(Json(report).into_response()),
        DeletionOutcome::Cancelled => Ok((
            StatusCode::PRECONDITION_REQUIRED,
            Json(ErrorResponse {
                error: "ConfirmationRequired".to_string(),
                message: request.confirmation_prompt(),
            }),
        )
            .into_response()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignChapterRequest {
    chapter_id: Option<String>,
    position: Option<i64>,
}

async fn assign_chapter(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path((gallery_id, photo_id)): Path<(String, String)>,
    Json(req): Json<AssignChapterRequest>,
) -> GalleryResult<Json<Photo>> {
    let photo = ctx
        .photos
        .assign_chapter(&gallery_id, &photo_id, req.chapter_id, req.position)
        .await?;
    Ok(Json(photo))
}

// ============================================================================
// Chapters
// ============================================================================

async fn list_chapters(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(gallery_id): Path<String>,
) -> GalleryResult<Json<Vec<Chapter>>> {
    Ok(Json(ctx.chapters.list(&gallery_id).await?))
}

async fn create_chapter(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(gallery_id): Path<String>,
    Json(req): Json<NewChapter>,
) -> GalleryResult<(StatusCode, Json<Chapter>)> {
    let chapter = ctx.chapters.create(&gallery_id, req).await?;
    Ok((StatusCode::CREATED, Json(chapter)))
}

async fn update_chapter(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path((gallery_id, chapter_id)): Path<(String, String)>,
    Json(req): Json<ChapterUpdate>,
) -> GalleryResult<Json<Chapter>> {
    Ok(Json(ctx.chapters.update(&gallery_id, &chapter_id, req).await?))
}

async fn delete_chapter(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path((gallery_id, chapter_id)): Path<(String, String)>,
) -> GalleryResult<Json<serde_json::Value>> {
    let unassigned = ctx.chapters.delete(&gallery_id, &chapter_id).await?;
    Ok(Json(serde_json::json!({ "unassignedPhotos": unassigned })))
}

// ============================================================================
// Password requests
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListPasswordRequestsQuery {
    status: Option<String>,
}

async fn list_password_requests(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Query(query): Query<ListPasswordRequestsQuery>,
) -> GalleryResult<Json<Vec<PasswordRequest>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()
        .map_err(GalleryError::Validation)?;

    Ok(Json(ctx.password_requests.list(status).await?))
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: RequestStatus,
}

async fn set_password_request_status(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(request_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> GalleryResult<Json<PasswordRequest>> {
    Ok(Json(
        ctx.password_requests
            .set_status(&request_id, req.status)
            .await?,
    ))
}
