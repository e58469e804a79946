/// Admin authentication extractor
use crate::{context::AppContext, error::GalleryError};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use subtle::ConstantTimeEq;

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Compare secrets in constant time
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

/// Admin authentication context - requires the configured admin token
#[derive(Debug, Clone)]
pub struct AdminAuthContext;

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = GalleryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            GalleryError::Authentication("Missing authorization header".to_string())
        })?;

        if !tokens_match(&token, &state.config.admin.token) {
            tracing::debug!("Rejected admin request with invalid token");
            return Err(GalleryError::Authentication("Invalid admin token".to_string()));
        }

        Ok(AdminAuthContext)
    }
}
