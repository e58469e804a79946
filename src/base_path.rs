/// Base path resolution
///
/// The gallery can be mounted at the site root (`/`) or under a fixed
/// subdirectory (`/wedgallery/`). Every link the service hands out is built
/// through [`BasePath::build_url`] so the same build works at either mount
/// point without doubled separators or doubled prefixes.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base path baked in at compile time, if any
const BUILD_BASE_PATH: Option<&str> = option_env!("GALLERY_BASE_PATH");

/// Normalized deployment base path
///
/// Always starts and ends with `/`. The root mount is exactly `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct BasePath {
    path: String,
}

impl BasePath {
    /// Normalize a configured base path
    ///
    /// `""`, `"/"` and `"//"` all mean the root. `"app"`, `"/app"` and
    /// `"/app/"` all become `/app/`.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Self::root();
        }

        Self {
            path: format!("/{}/", trimmed),
        }
    }

    /// The root mount point
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
        }
    }

    /// Base path from build-time configuration (`GALLERY_BASE_PATH`)
    pub fn from_build() -> Self {
        BUILD_BASE_PATH.map(Self::new).unwrap_or_else(Self::root)
    }

    /// The configured base path, verbatim
    pub fn resolve_base_path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Directory portion of the base path without separators
    ///
    /// `/wedgallery/` -> `wedgallery`, root -> `""`.
    pub fn directory(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// Nesting point for the HTTP router (`/wedgallery`), `None` at root
    pub fn mount_point(&self) -> Option<String> {
        if self.is_root() {
            None
        } else {
            Some(format!("/{}", self.directory()))
        }
    }

    /// Build an application-relative URL for a logical path
    ///
    /// - `""` and `"/"` return the base path verbatim.
    /// - Leading separators are stripped before joining, so the join point
    ///   never carries `//`.
    /// - A path that already begins with the base directory is treated as
    ///   already prefixed and is returned re-rooted at `/` instead of being
    ///   prefixed a second time.
    pub fn build_url(&self, logical_path: &str) -> String {
        if logical_path.is_empty() || logical_path == "/" {
            return self.path.clone();
        }

        let rest = logical_path.trim_start_matches('/');
        if rest.is_empty() {
            return self.path.clone();
        }

        let directory = self.directory();
        if !directory.is_empty() {
            if rest == directory {
                return self.path.clone();
            }
            if let Some(tail) = rest.strip_prefix(directory) {
                if tail.starts_with('/') {
                    tracing::debug!(
                        path = logical_path,
                        base = %self.path,
                        "Path already carries the base directory, not prefixing again"
                    );
                    return format!("/{}", rest);
                }
            }
        }

        format!("{}{}", self.path, rest)
    }
}

impl Default for BasePath {
    fn default() -> Self {
        Self::from_build()
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<String> for BasePath {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<BasePath> for String {
    fn from(base: BasePath) -> Self {
        base.path
    }
}
