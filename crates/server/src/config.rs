use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the listing site.
    pub base_url: String,
    /// Root directory for per-session downloads and archives.
    pub download_dir: PathBuf,
    /// Path to the MEGA downloader binary.
    pub mega_binary: String,
}

impl Config {
    pub fn new(base_url: String, download_dir: PathBuf, mega_binary: String) -> Self {
        Self {
            base_url,
            download_dir,
            mega_binary,
        }
    }
}
