use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::AnimeFlvError;
use crate::models::{AiringStatus, AnimeDetail, AnimeSummary, DownloadLink, EpisodeDetail};
use crate::script;
use crate::Result;

const BASE_URL: &str = "https://www3.animeflv.net";

const DEFAULT_TYPE: &str = "Unknown";
const DEFAULT_DESCRIPTION: &str = "Not available";
const DEFAULT_SERVER: &str = "Unknown";

pub struct AnimeFlvClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnimeFlvClient {
    /// Create a client with a shared reqwest Client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Create a client against a custom base URL (used by tests and
    /// mirror deployments).
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnimeFlvError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Fetch a browse/search page and extract its listing cards.
    pub async fn fetch_anime_list(&self, url: &str) -> Result<Vec<AnimeSummary>> {
        let html = self.fetch_html(url).await?;
        let animes = parse_anime_list(&html, &self.base_url)?;
        tracing::debug!("Extracted {} listing entries from {}", animes.len(), url);
        Ok(animes)
    }

    /// Fetch a detail page and assemble the full record, including the
    /// per-episode enrichment (sequential fetches, page order kept).
    pub async fn fetch_anime_details(&self, url: &str, content_type: &str) -> Result<AnimeDetail> {
        let html = self.fetch_html(url).await?;

        // Parse everything out of the document before the first await:
        // scraper's Html is not Send and must not live across one.
        let (mut detail, tuples) = {
            let document = Html::parse_document(&html);
            let detail = parse_detail_page(&document, content_type)?;
            let tuples = episode_tuples(&document);
            (detail, tuples)
        };

        detail.episodes = self
            .fetch_episode_list(url, content_type, tuples)
            .await?;
        Ok(detail)
    }

    /// Fetch and enrich the episode list for a detail page.
    ///
    /// "anime" and "ova" carry a full episode index; "película" is
    /// modeled as a one-element episode container; any other content
    /// type yields no episodes.
    async fn fetch_episode_list(
        &self,
        detail_url: &str,
        content_type: &str,
        tuples: Vec<Vec<Value>>,
    ) -> Result<Vec<EpisodeDetail>> {
        let count = episode_selection(content_type, tuples.len());
        let slug = detail_url.rsplit('/').next().unwrap_or_default();
        let mut episodes = Vec::with_capacity(count);

        for tuple in tuples.into_iter().take(count) {
            let Some(number) = tuple.first().and_then(Value::as_i64) else {
                tracing::debug!("Skipping episode tuple with non-integer number");
                continue;
            };
            let Some(id) = tuple.get(1).map(value_to_ident) else {
                continue;
            };

            let episode_url = format!("{}/ver/{}-{}", self.base_url, slug, number);
            let (image, download_links) = self.fetch_episode_details(&episode_url).await?;

            episodes.push(EpisodeDetail {
                episode: number,
                id,
                image,
                download_links,
            });
        }

        Ok(episodes)
    }

    /// Fetch one episode page: og:image plus the merged download links
    /// (table rows first, then script-sourced entries).
    ///
    /// A non-success status degrades to an empty image and link list;
    /// only transport failures surface as errors.
    pub async fn fetch_episode_details(
        &self,
        episode_url: &str,
    ) -> Result<(String, Vec<DownloadLink>)> {
        let response = self.client.get(episode_url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(
                "Episode page {} returned HTTP {}, skipping",
                episode_url,
                response.status()
            );
            return Ok((String::new(), Vec::new()));
        }
        let html = response.text().await?;
        parse_episode_page(&html)
    }
}

/// Extract listing cards. Cards missing a title or link node are
/// skipped rather than failing the whole page.
pub fn parse_anime_list(html: &str, base_url: &str) -> Result<Vec<AnimeSummary>> {
    let document = Html::parse_document(html);
    let card_selector = sel(".Anime.alt.B")?;
    let title_selector = sel("h3.Title")?;
    let link_selector = sel("a")?;
    let poster_selector = sel("figure img")?;
    let type_selector = sel(".Type")?;

    let mut animes = Vec::new();

    for card in document.select(&card_selector) {
        let Some(title) = card
            .select(&title_selector)
            .next()
            .map(|node| node.text().collect::<String>().trim().to_string())
        else {
            tracing::debug!("Skipping listing card without a title node");
            continue;
        };
        let Some(href) = card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            tracing::debug!("Skipping listing card without a link node");
            continue;
        };

        let link = format!("{}{}", base_url, href);

        let poster = card
            .select(&poster_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default();
        let poster = if poster.starts_with('/') {
            format!("{}{}", base_url, poster)
        } else {
            poster.to_string()
        };

        let anime_type = card
            .select(&type_selector)
            .next()
            .map(|node| node.text().collect::<String>().trim().to_string())
            .unwrap_or_else(|| DEFAULT_TYPE.to_string());

        animes.push(AnimeSummary {
            title,
            link,
            poster,
            anime_type,
        });
    }

    Ok(animes)
}

/// Extract the metadata fields of a detail page. The episode list is
/// left empty; enrichment needs further fetches.
pub fn parse_detail_page(document: &Html, content_type: &str) -> Result<AnimeDetail> {
    let title_alt = document
        .select(&sel(".TxtAlt")?)
        .map(|node| node.text().collect::<String>().trim().to_string())
        .collect();

    let description = document
        .select(&sel(".Description p")?)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let genres = document
        .select(&sel(".Nvgnrs a")?)
        .map(|node| node.text().collect::<String>().trim().to_string())
        .collect();

    let status_text = document
        .select(&sel(".AnmStts span")?)
        .next()
        .map(|node| node.text().collect::<String>())
        .unwrap_or_default();
    let status = AiringStatus::from_text(&status_text);

    let followers = first_text(document, ".WdgtCn .Title span")?.unwrap_or_else(|| "0".into());
    let rating = first_text(document, "#votes_prmd")?.unwrap_or_else(|| "0.0".into());
    let votes = first_text(document, "#votes_nmbr")?.unwrap_or_else(|| "0".into());

    let next_episode_date = if status == AiringStatus::Airing {
        next_episode_date(document)
    } else {
        None
    };

    Ok(AnimeDetail {
        title_alt,
        description,
        genres,
        status,
        content_type: content_type.to_string(),
        followers,
        rating,
        votes,
        next_episode_date,
        episodes: Vec::new(),
    })
}

/// The next broadcast date lives in the 4th element of the
/// `var anime_info` blob, when it looks like a `YYYY-MM-DD` date.
fn next_episode_date(document: &Html) -> Option<String> {
    let info = script::find_script_array(document, "anime_info")?;
    let candidate = info.get(3)?.as_str()?;
    if is_iso_date_prefix(candidate) {
        Some(candidate.to_string())
    } else {
        None
    }
}

fn is_iso_date_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// The `var episodes` blob: a list of `[number, id, ...]` tuples.
fn episode_tuples(document: &Html) -> Vec<Vec<Value>> {
    script::find_script_array(document, "episodes")
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Extract the og:image and both download-link sources of an episode
/// page: the download table first, then the `var videos` blob.
pub fn parse_episode_page(html: &str) -> Result<(String, Vec<DownloadLink>)> {
    let document = Html::parse_document(html);

    let image = document
        .select(&sel(r#"meta[property="og:image"]"#)?)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let mut links = table_links(&document)?;
    links.extend(script_links(&document));

    Ok((image, links))
}

/// Table rows with exactly 4 cells map to (server, format, language,
/// url); any other width is silently skipped.
fn table_links(document: &Html) -> Result<Vec<DownloadLink>> {
    let row_selector = sel(".DwsldCnTbl tbody tr")?;
    let cell_selector = sel("td")?;
    let anchor_selector = sel("a")?;

    let mut links = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() != 4 {
            continue;
        }

        let text = |index: usize| cells[index].text().collect::<String>().trim().to_string();
        let url = cells[3]
            .select(&anchor_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        links.push(DownloadLink {
            server: text(0),
            format: text(1),
            language: text(2),
            url,
        });
    }

    Ok(links)
}

/// The `var videos` blob maps quality labels to lists of link objects.
/// Every entry carrying a `url` becomes a link; the quality label is
/// discarded and format/language are fixed.
fn script_links(document: &Html) -> Vec<DownloadLink> {
    let Some(Value::Object(groups)) = script::find_script_object(document, "videos") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for entries in groups.values() {
        let Some(entries) = entries.as_array() else {
            continue;
        };
        for entry in entries {
            let Some(url) = entry.get("url").and_then(Value::as_str) else {
                continue;
            };
            let server = entry
                .get("server")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_SERVER);

            links.push(DownloadLink {
                server: server.to_string(),
                format: "MP4".to_string(),
                language: "SUB".to_string(),
                url: url.to_string(),
            });
        }
    }
    links
}

/// How many episode tuples a content type consumes: series types take
/// all of them, movies only the first, anything else none.
fn episode_selection(content_type: &str, total: usize) -> usize {
    match content_type.to_lowercase().as_str() {
        "anime" | "ova" => total,
        "película" => total.min(1),
        _ => 0,
    }
}

/// Identifiers in the episode blob may be numbers or strings.
fn value_to_ident(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn first_text(document: &Html, selector: &str) -> Result<Option<String>> {
    Ok(document
        .select(&sel(selector)?)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string()))
}

fn sel(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AnimeFlvError::Parse(e.to_string()))
}
