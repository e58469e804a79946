/// API routes and handlers
pub mod admin;
pub mod gallery;
pub mod media;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(gallery::routes())
        .merge(admin::routes())
        .merge(media::routes())
}
