/// Gallery domain
///
/// Galleries, their photos and chapters, and guests' password requests.
/// All state lives in the document store; managers hold no cached copies.
pub mod chapters;
pub mod galleries;
pub mod models;
pub mod password;
pub mod photos;
pub mod requests;

pub use chapters::ChapterManager;
pub use galleries::GalleryManager;
pub use models::*;
pub use photos::{NewPhoto, PhotoManager};
pub use requests::PasswordRequestManager;
