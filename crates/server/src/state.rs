use std::sync::Arc;
use std::time::Duration;

use animeflv::AnimeFlvClient;
use provider::ProviderConfig;
use reqwest::Client;

use crate::config::Config;
use crate::services::{AcquisitionService, ProgressStore, ProviderService};

/// How often finished sessions are swept from the progress store
const EVICTION_INTERVAL: Duration = Duration::from_secs(300);
/// How long a finished session's state stays queryable
const EVICTION_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: Client,
    pub animeflv: Arc<AnimeFlvClient>,
    pub provider: Arc<ProviderService>,
    pub store: Arc<ProgressStore>,
    pub acquisition: Arc<AcquisitionService>,
}

impl AppState {
    pub fn new(config: Config) -> provider::Result<Self> {
        let http_client = Client::new();
        let animeflv = Arc::new(AnimeFlvClient::with_base_url(
            http_client.clone(),
            &config.base_url,
        ));

        let provider = Arc::new(ProviderService::from_config(ProviderConfig::mega(
            &config.mega_binary,
        ))?);

        let store = Arc::new(ProgressStore::new());
        store.start_eviction(EVICTION_INTERVAL, EVICTION_TTL);

        let acquisition = Arc::new(AcquisitionService::new(
            Arc::clone(&provider),
            Arc::clone(&store),
            config.download_dir.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            http_client,
            animeflv,
            provider,
            store,
            acquisition,
        })
    }
}
