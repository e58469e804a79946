/// Configuration management for the gallery service
use crate::base_path::BasePath;
use crate::error::{GalleryError, GalleryResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "wedgallery=debug,tower_http=debug";

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub base_path: BasePath,
    pub max_upload_bytes: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub blobstore: BlobstoreConfig,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlobstoreConfig {
    Disk { location: PathBuf },
}

/// Admin API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required on /api/admin routes
    pub token: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// Parse an optional setting, rejecting values that do not parse
fn parse_setting<T: FromStr>(name: &str, raw: Option<String>, default: T) -> GalleryResult<T> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GalleryError::Validation(format!("Invalid value for {}: {}", name, raw))),
        None => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GalleryResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GALLERY_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_setting("GALLERY_PORT", env::var("GALLERY_PORT").ok(), 8080u16)?;

        // Runtime override of the build-time base path
        let base_path = env::var("GALLERY_BASE_PATH")
            .map(|raw| BasePath::new(&raw))
            .unwrap_or_else(|_| BasePath::from_build());

        let max_upload_bytes = parse_setting(
            "GALLERY_MAX_UPLOAD_BYTES",
            env::var("GALLERY_MAX_UPLOAD_BYTES").ok(),
            26_214_400usize,
        )?;

        let data_directory: PathBuf = env::var("GALLERY_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("GALLERY_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("gallery.sqlite"));
        let blobstore = BlobstoreConfig::Disk {
            location: env::var("GALLERY_BLOBSTORE_DISK_LOCATION")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_directory.join("blobs")),
        };

        let token = env::var("GALLERY_ADMIN_TOKEN")
            .map_err(|_| GalleryError::Validation("Admin token required".to_string()))?;

        let level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        let json = env::var("GALLERY_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                base_path,
                max_upload_bytes,
            },
            storage: StorageConfig {
                data_directory,
                database,
                blobstore,
            },
            admin: AdminConfig { token },
            logging: LoggingConfig { level, json },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GalleryResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GalleryError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.admin.token.len() < 16 {
            return Err(GalleryError::Validation(
                "Admin token must be at least 16 characters".to_string(),
            ));
        }

        if self.service.max_upload_bytes == 0 {
            return Err(GalleryError::Validation(
                "Upload limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 8080,
                base_path: BasePath::new("/wedgallery/"),
                max_upload_bytes: 1024,
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                database: PathBuf::from("./data/gallery.sqlite"),
                blobstore: BlobstoreConfig::Disk {
                    location: PathBuf::from("./data/blobs"),
                },
            },
            admin: AdminConfig {
                token: "0123456789abcdef".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_token() {
        let mut config = sample_config();
        config.admin.token = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_setting_rejects_garbage() {
        assert_eq!(parse_setting("GALLERY_PORT", None, 8080u16).unwrap(), 8080);
        assert_eq!(
            parse_setting("GALLERY_PORT", Some("9000".to_string()), 8080u16).unwrap(),
            9000
        );
        assert!(matches!(
            parse_setting("GALLERY_MAX_UPLOAD_BYTES", Some("25MB".to_string()), 1usize),
            Err(GalleryError::Validation(_))
        ));
        assert!(parse_setting("GALLERY_PORT", Some("70000".to_string()), 8080u16).is_err());
    }

    #[test]
    fn test_default_log_filter_parses() {
        let level = LoggingConfig::default().level;
        assert!(tracing_subscriber::EnvFilter::try_new(&level).is_ok());
    }

    #[test]
    fn test_base_path_serializes_as_string() {
        let json = serde_json::to_value(&sample_config().service).unwrap();
        assert_eq!(json["base_path"], "/wedgallery/");
    }
}
