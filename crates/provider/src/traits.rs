use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// Core storage-provider interface.
///
/// A provider turns a share URL into local files. Authentication and
/// session handling stay behind this seam; callers only see
/// `login`/`download_url`.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Establish (or re-establish) a provider session.
    async fn login(&self) -> Result<()>;

    /// Check whether the provider is currently usable.
    async fn is_login(&self) -> Result<bool>;

    /// Download the file behind `url` into `dest_dir`.
    ///
    /// Returns the paths of the downloaded files; providers that
    /// resolve a share link to a single file return one path.
    async fn download_url(&self, url: &str, dest_dir: &Path) -> Result<Vec<PathBuf>>;

    /// URL prefix this provider accepts (used for request validation)
    fn url_prefix(&self) -> &str;

    /// Provider type name (for logging)
    fn provider_type(&self) -> &'static str;
}
