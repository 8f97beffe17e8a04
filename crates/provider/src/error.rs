use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider command failed: {0}")]
    Command(String),

    #[error("URL is not handled by this provider: {0}")]
    InvalidUrl(String),

    #[error("Provider not configured")]
    NotConfigured,

    #[error("Download produced no files")]
    NoOutput,
}

pub type Result<T> = std::result::Result<T, ProviderError>;
