//! Wedgallery - password-protected wedding photo galleries
//!
//! Galleries, photos and chapters are kept in a collection/document store
//! backed by SQLite; photo binaries live in a blob store. The service can be
//! mounted at the site root or under a subdirectory (see [`base_path`]).

pub mod api;
pub mod auth;
pub mod base_path;
pub mod blob_store;
pub mod config;
pub mod context;
pub mod db;
pub mod deletion;
pub mod doc_store;
pub mod error;
pub mod gallery;
pub mod metrics;
pub mod server;

pub use context::AppContext;
pub use error::{GalleryError, GalleryResult};
