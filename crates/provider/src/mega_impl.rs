use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ProviderError, Result};
use crate::traits::StorageProvider;

const MEGA_URL_PREFIX: &str = "https://mega.nz/";

/// MEGA provider backed by the `megadl` tool (megatools).
///
/// The tool writes the resolved file into the destination directory;
/// downloaded paths are discovered by listing that directory after the
/// run, so each session must use its own directory.
pub struct MegaProvider {
    binary_path: String,
}

impl MegaProvider {
    /// Create a MEGA provider around a `megadl` binary.
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    async fn probe_binary(&self) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                ProviderError::Command(format!(
                    "Failed to run {}: {}",
                    self.binary_path, e
                ))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ProviderError::Command(format!(
                "{} --version exited with {}",
                self.binary_path, output.status
            )))
        }
    }
}

#[async_trait]
impl StorageProvider for MegaProvider {
    /// MEGA share links need no account session; "login" verifies the
    /// downloader binary is present and runnable.
    async fn login(&self) -> Result<()> {
        self.probe_binary().await?;
        tracing::debug!("MEGA downloader binary available: {}", self.binary_path);
        Ok(())
    }

    async fn is_login(&self) -> Result<bool> {
        Ok(self.probe_binary().await.is_ok())
    }

    async fn download_url(&self, url: &str, dest_dir: &Path) -> Result<Vec<PathBuf>> {
        if !url.starts_with(MEGA_URL_PREFIX) {
            return Err(ProviderError::InvalidUrl(url.to_string()));
        }

        std::fs::create_dir_all(dest_dir)?;

        tracing::info!("Downloading {} into {}", url, dest_dir.display());
        let output = Command::new(&self.binary_path)
            .arg("--path")
            .arg(dest_dir)
            .arg(url)
            .output()
            .await
            .map_err(|e| {
                ProviderError::Command(format!("Failed to run {}: {}", self.binary_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Command(format!(
                "megadl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let files = list_files(dest_dir)?;
        if files.is_empty() {
            return Err(ProviderError::NoOutput);
        }
        tracing::debug!("Downloaded {} file(s) from {}", files.len(), url);
        Ok(files)
    }

    fn url_prefix(&self) -> &str {
        MEGA_URL_PREFIX
    }

    fn provider_type(&self) -> &'static str {
        "MEGA"
    }
}

/// Regular files in `dir`, sorted by name for deterministic ordering.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_foreign_url() {
        let provider = MegaProvider::new("megadl");
        let dir = tempfile::tempdir().unwrap();
        let result = provider
            .download_url("https://example.com/file", dir.path())
            .await;
        assert!(matches!(result, Err(ProviderError::InvalidUrl(_))));
    }

    #[test]
    fn test_list_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.bin"), b"b").unwrap();
        std::fs::write(dir.path().join("a.bin"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.bin"));
        assert!(files[1].ends_with("b.bin"));
    }

    #[test]
    fn test_url_prefix() {
        let provider = MegaProvider::new("megadl");
        assert_eq!(provider.url_prefix(), "https://mega.nz/");
        assert_eq!(provider.provider_type(), "MEGA");
    }
}
