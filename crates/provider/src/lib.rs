mod client;
mod config;
mod error;
mod mega_impl;
mod traits;

pub use client::ProviderClient;
pub use config::{ProviderConfig, ProviderType};
pub use error::ProviderError;
pub use mega_impl::MegaProvider;
pub use traits::StorageProvider;

/// Result type alias for storage-provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
