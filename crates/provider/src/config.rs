use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Storage provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Mega,
}

/// Configuration for creating a provider client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider type
    pub provider_type: ProviderType,
    /// Path to the provider's downloader binary (MEGA: megadl)
    pub binary_path: String,
}

impl ProviderConfig {
    /// Create config for MEGA
    pub fn mega(binary_path: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::Mega,
            binary_path: binary_path.into(),
        }
    }
}
