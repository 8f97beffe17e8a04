use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::{ProviderConfig, ProviderType};
use crate::error::Result;
use crate::mega_impl::MegaProvider;
use crate::traits::StorageProvider;

/// Unified provider client (enum dispatch)
pub enum ProviderClient {
    Mega(MegaProvider),
}

impl ProviderClient {
    /// Create a provider client from configuration
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        match config.provider_type {
            ProviderType::Mega => Ok(Self::Mega(MegaProvider::new(config.binary_path))),
        }
    }
}

#[async_trait]
impl StorageProvider for ProviderClient {
    async fn login(&self) -> Result<()> {
        match self {
            Self::Mega(p) => p.login().await,
        }
    }

    async fn is_login(&self) -> Result<bool> {
        match self {
            Self::Mega(p) => p.is_login().await,
        }
    }

    async fn download_url(&self, url: &str, dest_dir: &Path) -> Result<Vec<PathBuf>> {
        match self {
            Self::Mega(p) => p.download_url(url, dest_dir).await,
        }
    }

    fn url_prefix(&self) -> &str {
        match self {
            Self::Mega(p) => p.url_prefix(),
        }
    }

    fn provider_type(&self) -> &'static str {
        match self {
            Self::Mega(p) => p.provider_type(),
        }
    }
}
