use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimeFlvError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}
