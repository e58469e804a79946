/// Guest password request management
use crate::{
    doc_store::{self, DocumentStore, FieldFilter},
    error::{GalleryError, GalleryResult},
    gallery::{
        models::{password_request_path, NewPasswordRequest, PasswordRequest, RequestStatus, PASSWORD_REQUESTS},
        GalleryManager,
    },
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct PasswordRequestManager {
    documents: Arc<dyn DocumentStore>,
    galleries: GalleryManager,
}

impl PasswordRequestManager {
    pub fn new(documents: Arc<dyn DocumentStore>, galleries: GalleryManager) -> Self {
        Self {
            documents,
            galleries,
        }
    }

    /// Record a guest's request for the password of gallery `code`
    pub async fn create(
        &self,
        code: &str,
        new: NewPasswordRequest,
    ) -> GalleryResult<PasswordRequest> {
        new.validate()?;

        let gallery = self
            .galleries
            .find_by_code(code)
            .await?
            .filter(|g| g.active)
            .ok_or_else(|| GalleryError::NotFound(format!("Gallery not found: {}", code)))?;

        let request = PasswordRequest {
            id: Uuid::new_v4().to_string(),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            relation: new.relation.trim().to_string(),
            gallery_id: gallery.id,
            gallery_code: gallery.code,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };

        doc_store::put(
            self.documents.as_ref(),
            &password_request_path(&request.id),
            &request,
        )
        .await?;

        tracing::info!(
            request_id = %request.id,
            gallery_code = %request.gallery_code,
            "Password request received"
        );

        Ok(request)
    }

    /// List requests, newest first, optionally by status
    pub async fn list(&self, status: Option<RequestStatus>) -> GalleryResult<Vec<PasswordRequest>> {
        let filters: Vec<FieldFilter> = status
            .map(|s| vec![FieldFilter::eq("status", s.as_str())])
            .unwrap_or_default();

        let docs = self.documents.query(PASSWORD_REQUESTS, &filters).await?;
        let mut requests = docs
            .iter()
            .map(|doc| doc.decode::<PasswordRequest>())
            .collect::<GalleryResult<Vec<_>>>()?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(requests)
    }

    pub async fn set_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> GalleryResult<PasswordRequest> {
        let path = password_request_path(request_id);
        let mut request: PasswordRequest = doc_store::fetch(self.documents.as_ref(), &path)
            .await?
            .ok_or_else(|| {
                GalleryError::NotFound(format!("Password request not found: {}", request_id))
            })?;

        request.status = status;
        doc_store::put(self.documents.as_ref(), &path, &request).await?;

        Ok(request)
    }
}
