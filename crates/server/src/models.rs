use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Session state machine: Pending/InProgress may advance, Completed and
/// Error are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Current snapshot of one download session. Updates replace the whole
/// snapshot; there is no partial mutation.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub session_id: String,
    pub status: DownloadStatus,
    pub message: String,
    pub file: Option<PathBuf>,
    pub updated_at: Instant,
}

impl DownloadProgress {
    fn snapshot(
        session_id: impl Into<String>,
        status: DownloadStatus,
        message: impl Into<String>,
        file: Option<PathBuf>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            status,
            message: message.into(),
            file,
            updated_at: Instant::now(),
        }
    }

    pub fn pending(session_id: impl Into<String>) -> Self {
        Self::snapshot(session_id, DownloadStatus::Pending, "Accepted", None)
    }

    pub fn in_progress(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::snapshot(session_id, DownloadStatus::InProgress, message, None)
    }

    pub fn completed(session_id: impl Into<String>, file: PathBuf) -> Self {
        Self::snapshot(session_id, DownloadStatus::Completed, "", Some(file))
    }

    pub fn error(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::snapshot(session_id, DownloadStatus::Error, message, None)
    }
}

/// Wire shape pushed to a progress subscriber: `{status, message}`
/// while running, `{status: "completed", file}` at the end.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressMessage {
    pub status: DownloadStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl From<&DownloadProgress> for ProgressMessage {
    fn from(progress: &DownloadProgress) -> Self {
        Self {
            status: progress.status,
            message: progress.message.clone(),
            file: progress
                .file
                .as_ref()
                .map(|path| path.display().to_string()),
        }
    }
}

/// Body of POST /download
#[derive(Debug, Deserialize, ToSchema)]
pub struct DownloadRequest {
    pub url: String,
    pub session_id: String,
}

/// Accept response of POST /download
#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadAccepted {
    pub message: String,
    pub url: String,
    pub session_id: String,
}

/// Query parameters of GET /anime-list
#[derive(Debug, Deserialize, IntoParams)]
pub struct AnimeListQuery {
    /// Page number, 1-based
    #[serde(default = "default_page")]
    pub page: u32,
    /// Free-text search query
    pub query: Option<String>,
    /// Release year filters (repeatable)
    #[serde(default)]
    pub year: Vec<i32>,
    /// Media type filters (repeatable)
    #[serde(default, rename = "type")]
    pub kinds: Vec<String>,
    /// Status filters (repeatable)
    #[serde(default)]
    pub status: Vec<i32>,
    /// Sort order
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_page() -> u32 {
    1
}

fn default_order() -> String {
    "default".to_string()
}

/// Response of GET /anime-list
#[derive(Debug, Serialize, ToSchema)]
pub struct AnimeListResponse {
    pub page: u32,
    pub animes: Vec<animeflv::AnimeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!DownloadStatus::Pending.is_terminal());
        assert!(!DownloadStatus::InProgress.is_terminal());
        assert!(DownloadStatus::Completed.is_terminal());
        assert!(DownloadStatus::Error.is_terminal());
    }

    #[test]
    fn test_progress_message_shapes() {
        let running = DownloadProgress::in_progress("s1", "Download in progress");
        let json = serde_json::to_value(ProgressMessage::from(&running)).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["message"], "Download in progress");
        assert!(json.get("file").is_none());

        let done = DownloadProgress::completed("s1", PathBuf::from("/tmp/a.tar.zst"));
        let json = serde_json::to_value(ProgressMessage::from(&done)).unwrap();
        assert_eq!(json["status"], "completed");
        assert!(json.get("message").is_none());
        assert_eq!(json["file"], "/tmp/a.tar.zst");
    }
}
