use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One card from a paginated browse/search page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnimeSummary {
    pub title: String,
    /// Detail page URL, always absolute.
    pub link: String,
    /// Poster image URL, always absolute.
    pub poster: String,
    /// Free-text media type label ("Anime", "OVA", ...).
    #[serde(rename = "type")]
    pub anime_type: String,
}

/// Airing state inferred from the detail page status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AiringStatus {
    Airing,
    Finished,
    Unknown,
}

impl AiringStatus {
    /// Infer the status from the page's status label.
    /// The site renders "En emision"/"En emisión" and "Finalizado".
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("emisi") {
            Self::Airing
        } else if lower.contains("finalizado") {
            Self::Finished
        } else {
            Self::Unknown
        }
    }
}

/// Full detail-page record, including the enriched episode list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnimeDetail {
    /// Alternate titles, in page order.
    pub title_alt: Vec<String>,
    pub description: String,
    pub genres: Vec<String>,
    pub status: AiringStatus,
    /// Content type label echoed from the caller, not inferred.
    #[serde(rename = "type")]
    pub content_type: String,
    pub followers: String,
    pub rating: String,
    pub votes: String,
    /// Next broadcast date (`YYYY-MM-DD`), only present while airing.
    pub next_episode_date: Option<String>,
    pub episodes: Vec<EpisodeDetail>,
}

/// A single episode (or the sole "episode" of a movie).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EpisodeDetail {
    pub episode: i64,
    pub id: String,
    /// og:image of the episode page, may be empty.
    pub image: String,
    pub download_links: Vec<DownloadLink>,
}

/// One download option. The two extraction sources may overlap;
/// entries are kept in source order without deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadLink {
    pub server: String,
    pub format: String,
    pub language: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_text() {
        assert_eq!(AiringStatus::from_text("En emision"), AiringStatus::Airing);
        assert_eq!(AiringStatus::from_text("En emisión"), AiringStatus::Airing);
        assert_eq!(
            AiringStatus::from_text("Finalizado"),
            AiringStatus::Finished
        );
        assert_eq!(AiringStatus::from_text("Proximamente"), AiringStatus::Unknown);
        assert_eq!(AiringStatus::from_text(""), AiringStatus::Unknown);
    }
}
