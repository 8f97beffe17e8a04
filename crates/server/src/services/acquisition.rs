use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::models::DownloadProgress;
use crate::services::archive;
use crate::services::progress::ProgressStore;
use crate::services::provider::ProviderService;

/// How long to wait for a downloaded file to become readable
const STABILITY_TIMEOUT: Duration = Duration::from_secs(30);
/// Poll interval of the stability wait
const STABILITY_POLL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("URL is not a valid {provider} link")]
    InvalidUrl { provider: &'static str },

    #[error(transparent)]
    Provider(#[from] provider::ProviderError),
}

/// Per-session download pipeline: trigger the remote download, wait
/// for the file to stabilize on disk, repackage it as .tar.zst, record
/// the terminal state. One background job per session; no retries, no
/// cancellation.
pub struct AcquisitionService {
    provider: Arc<ProviderService>,
    store: Arc<ProgressStore>,
    download_root: PathBuf,
    stability_timeout: Duration,
    stability_poll: Duration,
}

impl AcquisitionService {
    pub fn new(
        provider: Arc<ProviderService>,
        store: Arc<ProgressStore>,
        download_root: PathBuf,
    ) -> Self {
        Self {
            provider,
            store,
            download_root,
            stability_timeout: STABILITY_TIMEOUT,
            stability_poll: STABILITY_POLL,
        }
    }

    /// Shorten the stability wait (tests only).
    #[cfg(test)]
    pub fn with_stability_wait(mut self, timeout: Duration, poll: Duration) -> Self {
        self.stability_timeout = timeout;
        self.stability_poll = poll;
        self
    }

    /// Accept a download request.
    ///
    /// Validates the URL against the provider prefix and checks the
    /// provider session before creating any session state; on success
    /// the background job is already running. The returned handle is
    /// joinable but production callers may drop it; the job finishes
    /// on its own.
    pub async fn start(
        &self,
        url: String,
        session_id: String,
    ) -> Result<JoinHandle<()>, AcquisitionError> {
        if !url.starts_with(self.provider.url_prefix()) {
            return Err(AcquisitionError::InvalidUrl {
                provider: self.provider.provider_type(),
            });
        }
        self.provider.ensure_session().await?;

        self.store
            .insert(DownloadProgress::in_progress(
                &session_id,
                "Download in progress",
            ))
            .await;

        let job = AcquisitionJob {
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
            dest_dir: self.download_root.join(&session_id),
            url,
            session_id,
            stability_timeout: self.stability_timeout,
            stability_poll: self.stability_poll,
        };

        Ok(tokio::spawn(job.run()))
    }
}

struct AcquisitionJob {
    provider: Arc<ProviderService>,
    store: Arc<ProgressStore>,
    dest_dir: PathBuf,
    url: String,
    session_id: String,
    stability_timeout: Duration,
    stability_poll: Duration,
}

#[derive(Debug, Error)]
enum JobError {
    #[error(transparent)]
    Provider(#[from] provider::ProviderError),

    #[error("Downloaded file never became readable: {}", .0.display())]
    Stability(PathBuf),

    #[error("Compression failed: {0}")]
    Compression(String),
}

impl AcquisitionJob {
    async fn run(self) {
        if let Err(e) = self.execute().await {
            tracing::error!("Download session {} failed: {}", self.session_id, e);
            self.store
                .update(DownloadProgress::error(&self.session_id, e.to_string()))
                .await;
        }
    }

    async fn execute(&self) -> Result<(), JobError> {
        let files = self.provider.download_url(&self.url, &self.dest_dir).await?;
        // Share links resolve to a single file; keep the first.
        let file = files
            .into_iter()
            .next()
            .ok_or(provider::ProviderError::NoOutput)?;
        tracing::info!(
            "Session {}: downloaded {}",
            self.session_id,
            file.display()
        );

        self.store
            .update(DownloadProgress::in_progress(
                &self.session_id,
                "Processing file",
            ))
            .await;

        if !wait_for_file_release(&file, self.stability_timeout, self.stability_poll).await {
            return Err(JobError::Stability(file));
        }

        let dest_dir = self.dest_dir.clone();
        let source = file.clone();
        let archive = tokio::task::spawn_blocking(move || {
            archive::compress_tar_zst(&source, &dest_dir)
        })
        .await
        .map_err(|e| JobError::Compression(e.to_string()))?
        .map_err(|e| JobError::Compression(e.to_string()))?;

        tracing::info!(
            "Session {}: archived to {}",
            self.session_id,
            archive.display()
        );
        self.store
            .update(DownloadProgress::completed(&self.session_id, archive))
            .await;
        Ok(())
    }
}

/// Wait until the file can be opened and one byte read, polling up to
/// `timeout`. A missing file and a permission/lock error both count as
/// "not yet stable": the downloader may still be flushing or holding
/// the file.
pub async fn wait_for_file_release(path: &Path, timeout: Duration, poll: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if file_readable(path) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tracing::debug!("File not yet readable, waiting... {}", path.display());
        tokio::time::sleep(poll).await;
    }
}

fn file_readable(path: &Path) -> bool {
    match std::fs::File::open(path) {
        Ok(mut file) => {
            let mut byte = [0u8; 1];
            file.read(&mut byte).is_ok()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DownloadStatus;
    use async_trait::async_trait;
    use provider::{ProviderError, StorageProvider};

    /// Provider stub that materializes a fixed payload in dest_dir.
    struct FakeProvider {
        payload: Vec<u8>,
        fail: bool,
    }

    #[async_trait]
    impl StorageProvider for FakeProvider {
        async fn login(&self) -> provider::Result<()> {
            Ok(())
        }

        async fn is_login(&self) -> provider::Result<bool> {
            Ok(true)
        }

        async fn download_url(
            &self,
            _url: &str,
            dest_dir: &Path,
        ) -> provider::Result<Vec<PathBuf>> {
            if self.fail {
                return Err(ProviderError::Command("quota exceeded".into()));
            }
            std::fs::create_dir_all(dest_dir)?;
            let path = dest_dir.join("payload.bin");
            std::fs::write(&path, &self.payload)?;
            Ok(vec![path])
        }

        fn url_prefix(&self) -> &str {
            "https://mega.nz/"
        }

        fn provider_type(&self) -> &'static str {
            "MEGA"
        }
    }

    fn service(root: &Path, fake: FakeProvider) -> (AcquisitionService, Arc<ProgressStore>) {
        let store = Arc::new(ProgressStore::new());
        let provider = Arc::new(ProviderService::new(Box::new(fake)));
        let service = AcquisitionService::new(provider, Arc::clone(&store), root.to_path_buf())
            .with_stability_wait(Duration::from_millis(500), Duration::from_millis(20));
        (service, store)
    }

    #[tokio::test]
    async fn test_invalid_url_creates_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store) = service(
            dir.path(),
            FakeProvider {
                payload: vec![],
                fail: false,
            },
        );

        let result = service
            .start("https://example.com/f".into(), "s1".into())
            .await;
        assert!(matches!(
            result,
            Err(AcquisitionError::InvalidUrl { provider: "MEGA" })
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_pipeline_completes_and_archives() {
        let dir = tempfile::tempdir().unwrap();
        let payload = b"some downloaded bytes".to_vec();
        let (service, store) = service(
            dir.path(),
            FakeProvider {
                payload,
                fail: false,
            },
        );

        let handle = service
            .start("https://mega.nz/file/abc".into(), "s1".into())
            .await
            .unwrap();
        handle.await.unwrap();

        let progress = store.get("s1").await.unwrap();
        assert_eq!(progress.status, DownloadStatus::Completed);

        let archive = progress.file.unwrap();
        assert_eq!(archive, dir.path().join("s1").join("payload.bin.tar.zst"));
        assert!(archive.exists());
        assert!(!dir.path().join("s1").join("payload.bin.tar").exists());
    }

    #[tokio::test]
    async fn test_session_id_reuse_runs_a_fresh_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store) = service(
            dir.path(),
            FakeProvider {
                payload: b"first run".to_vec(),
                fail: false,
            },
        );

        let handle = service
            .start("https://mega.nz/file/abc".into(), "s1".into())
            .await
            .unwrap();
        handle.await.unwrap();
        assert_eq!(
            store.get("s1").await.unwrap().status,
            DownloadStatus::Completed
        );

        // The same id submitted again must run a new job, not sit
        // behind the previous run's terminal snapshot. The second
        // service shares the store but fails, so a state change to
        // Error proves the new job owns the session.
        let failing = Arc::new(ProviderService::new(Box::new(FakeProvider {
            payload: vec![],
            fail: true,
        })));
        let service =
            AcquisitionService::new(failing, Arc::clone(&store), dir.path().to_path_buf());
        let handle = service
            .start("https://mega.nz/file/def".into(), "s1".into())
            .await
            .unwrap();
        handle.await.unwrap();

        let progress = store.get("s1").await.unwrap();
        assert_eq!(progress.status, DownloadStatus::Error);
        assert!(progress.message.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_provider_failure_reaches_error_state() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store) = service(
            dir.path(),
            FakeProvider {
                payload: vec![],
                fail: true,
            },
        );

        let handle = service
            .start("https://mega.nz/file/abc".into(), "s1".into())
            .await
            .unwrap();
        handle.await.unwrap();

        let progress = store.get("s1").await.unwrap();
        assert_eq!(progress.status, DownloadStatus::Error);
        assert!(progress.message.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_wait_succeeds_once_file_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.bin");

        let writer = {
            let path = path.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(60)).await;
                std::fs::write(&path, b"x").unwrap();
            })
        };

        assert!(
            wait_for_file_release(
                &path,
                Duration::from_millis(500),
                Duration::from_millis(10)
            )
            .await
        );
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_times_out_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.bin");

        let started = std::time::Instant::now();
        assert!(
            !wait_for_file_release(
                &path,
                Duration::from_millis(100),
                Duration::from_millis(10)
            )
            .await
        );
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
