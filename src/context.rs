/// Application context and dependency injection
use crate::{
    blob_store::{BlobBackend, DiskBlobBackend, LegacyKeyLayout, StorageKeyResolver},
    config::{BlobstoreConfig, ServerConfig},
    db,
    deletion::{DeletionTracker, Notifier, PhotoDeletion, TracingNotifier},
    doc_store::{DocumentStore, SqliteDocumentStore},
    error::{GalleryError, GalleryResult},
    gallery::{ChapterManager, GalleryManager, PasswordRequestManager, PhotoManager},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobBackend>,
    pub galleries: Arc<GalleryManager>,
    pub photos: Arc<PhotoManager>,
    pub chapters: Arc<ChapterManager>,
    pub password_requests: Arc<PasswordRequestManager>,
    pub deletion: Arc<PhotoDeletion>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> GalleryResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let blobs: Arc<dyn BlobBackend> = match &config.storage.blobstore {
            BlobstoreConfig::Disk { location } => Arc::new(DiskBlobBackend::new(location.clone())),
        };
        let documents: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(db.clone()));

        Ok(Self::from_parts(config, db, documents, blobs))
    }

    /// Wire services over already-open stores
    pub fn from_parts(
        config: ServerConfig,
        db: SqlitePool,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobBackend>,
    ) -> Self {
        let keys: Arc<dyn StorageKeyResolver> = Arc::new(LegacyKeyLayout);
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        let galleries = GalleryManager::new(documents.clone());
        let photos = PhotoManager::new(
            documents.clone(),
            blobs.clone(),
            keys.clone(),
            galleries.clone(),
            config.service.base_path.clone(),
        );
        let chapters = ChapterManager::new(documents.clone(), galleries.clone());
        let password_requests = PasswordRequestManager::new(documents.clone(), galleries.clone());
        let deletion = PhotoDeletion::new(
            documents.clone(),
            blobs.clone(),
            keys,
            notifier,
            DeletionTracker::new(),
        );

        Self {
            config: Arc::new(config),
            db,
            documents,
            blobs,
            galleries: Arc::new(galleries),
            photos: Arc::new(photos),
            chapters: Arc::new(chapters),
            password_requests: Arc::new(password_requests),
            deletion: Arc::new(deletion),
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> GalleryResult<()> {
        let data_dir = &config.storage.data_directory;
        tokio::fs::create_dir_all(data_dir).await.map_err(|e| {
            GalleryError::Internal(format!("Failed to create directory {:?}: {}", data_dir, e))
        })?;

        let BlobstoreConfig::Disk { location } = &config.storage.blobstore;
        tokio::fs::create_dir_all(location).await?;

        Ok(())
    }

    /// Public URL of the service root
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.config.service.hostname,
            self.config.service.port,
            self.config.service.base_path
        )
    }
}
