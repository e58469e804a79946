/// Gallery data models and document paths
use crate::doc_store::DocPath;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Top-level gallery collection
pub const GALLERIES: &str = "galleries";
/// Flat, denormalized photo collection used for cross-gallery queries
pub const GALLERY_PHOTOS: &str = "gallery-photos";
/// Guest access requests
pub const PASSWORD_REQUESTS: &str = "password-requests";

pub fn gallery_path(gallery_id: &str) -> DocPath {
    DocPath::new(GALLERIES, gallery_id)
}

pub fn photos_collection(gallery_id: &str) -> String {
    format!("{}/{}/photos", GALLERIES, gallery_id)
}

/// Canonical photo record: `galleries/{galleryId}/photos/{photoId}`
pub fn photo_path(gallery_id: &str, photo_id: &str) -> DocPath {
    DocPath::new(photos_collection(gallery_id), photo_id)
}

pub fn chapters_collection(gallery_id: &str) -> String {
    format!("{}/{}/chapters", GALLERIES, gallery_id)
}

pub fn chapter_path(gallery_id: &str, chapter_id: &str) -> DocPath {
    DocPath::new(chapters_collection(gallery_id), chapter_id)
}

pub fn indexed_photo_path(record_id: &str) -> DocPath {
    DocPath::new(GALLERY_PHOTOS, record_id)
}

pub fn password_request_path(request_id: &str) -> DocPath {
    DocPath::new(PASSWORD_REQUESTS, request_id)
}

fn default_active() -> bool {
    true
}

/// Gallery codes are lowercase letters, digits and hyphens
pub fn validate_gallery_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > 64 {
        return Err(ValidationError::new("gallery_code_length"));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::new("gallery_code_charset"));
    }
    Ok(())
}

/// A password-protected gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    #[serde(default)]
    pub photo_count: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Gallery as returned over the API (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySummary {
    pub id: String,
    pub code: String,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub photo_count: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Gallery> for GallerySummary {
    fn from(gallery: &Gallery) -> Self {
        Self {
            id: gallery.id.clone(),
            code: gallery.code.clone(),
            name: gallery.name.clone(),
            date: gallery.date,
            location: gallery.location.clone(),
            photo_count: gallery.photo_count,
            active: gallery.active,
            created_at: gallery.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewGallery {
    #[validate(custom(function = "validate_gallery_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 4, max = 128))]
    pub password: String,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GalleryUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub active: Option<bool>,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
}

/// Canonical photo record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub gallery_id: String,
    /// Also the last segment of the photo's storage key
    pub name: String,
    pub url: String,
    pub size: i64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub chapter_id: Option<String>,
    pub chapter_position: Option<i64>,
}

/// Denormalized photo record in the flat `gallery-photos` collection
///
/// Linked to its canonical record by `(galleryId, name)`. Records written
/// by this service also carry `photoId`; older records may not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPhoto {
    pub gallery_id: String,
    #[serde(default)]
    pub photo_id: Option<String>,
    pub name: String,
    pub url: String,
    pub size: i64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Photo> for IndexedPhoto {
    fn from(photo: &Photo) -> Self {
        Self {
            gallery_id: photo.gallery_id.clone(),
            photo_id: Some(photo.id.clone()),
            name: photo.name.clone(),
            url: photo.url.clone(),
            size: photo.size,
            content_type: photo.content_type.clone(),
            created_at: photo.created_at,
        }
    }
}

/// Ordering label over photos within a gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub gallery_id: String,
    pub title: String,
    pub description: Option<String>,
    pub position: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewChapter {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChapterUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub position: Option<i64>,
}

/// Status of a guest's access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("Unknown request status: {}", other)),
        }
    }
}

/// A guest's request for a gallery password
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub relation: String,
    pub gallery_id: String,
    pub gallery_code: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub relation: String,
}
