use std::path::{Path, PathBuf};

use provider::{ProviderClient, ProviderConfig, StorageProvider};
use tokio::sync::RwLock;

/// Service that manages the storage-provider session.
///
/// The session is established lazily on first use and re-attempted on
/// every request while it is down, so a provider outage at startup
/// does not poison the process.
pub struct ProviderService {
    provider: Box<dyn StorageProvider>,
    ready: RwLock<bool>,
}

impl ProviderService {
    pub fn from_config(config: ProviderConfig) -> provider::Result<Self> {
        Ok(Self::new(Box::new(ProviderClient::from_config(config)?)))
    }

    /// Wrap an arbitrary provider implementation (used by tests).
    pub fn new(provider: Box<dyn StorageProvider>) -> Self {
        Self {
            provider,
            ready: RwLock::new(false),
        }
    }

    /// Ensure a usable session, logging in if needed.
    pub async fn ensure_session(&self) -> provider::Result<()> {
        {
            let ready = self.ready.read().await;
            if *ready {
                return Ok(());
            }
        }

        let mut ready = self.ready.write().await;
        // Another task may have logged in while we waited.
        if *ready {
            return Ok(());
        }

        tracing::info!("Establishing {} session...", self.provider.provider_type());
        self.provider.login().await?;
        tracing::info!("{} session established", self.provider.provider_type());
        *ready = true;
        Ok(())
    }

    pub async fn download_url(&self, url: &str, dest_dir: &Path) -> provider::Result<Vec<PathBuf>> {
        self.ensure_session().await?;
        self.provider.download_url(url, dest_dir).await
    }

    pub fn url_prefix(&self) -> &str {
        self.provider.url_prefix()
    }

    pub fn provider_type(&self) -> &'static str {
        self.provider.provider_type()
    }
}
