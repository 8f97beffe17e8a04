mod client;
mod error;
pub mod models;
mod script;

pub use client::AnimeFlvClient;
pub use error::AnimeFlvError;
pub use models::{AiringStatus, AnimeDetail, AnimeSummary, DownloadLink, EpisodeDetail};

pub type Result<T> = std::result::Result<T, AnimeFlvError>;
