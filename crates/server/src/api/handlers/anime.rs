use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::models::{AnimeListQuery, AnimeListResponse};
use crate::state::AppState;

/// Query parameters for the detail endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct DetailQuery {
    /// Absolute detail page URL
    pub url: String,
    /// Content type label: Anime, Película, Especial, OVA
    pub content_type: String,
}

/// Browse the listing site and extract the result cards
#[utoipa::path(
    get,
    path = "/anime-list",
    tag = "anime",
    params(AnimeListQuery),
    responses(
        (status = 200, description = "Listing entries for the page", body = AnimeListResponse)
    )
)]
pub async fn get_anime_list(
    State(state): State<AppState>,
    Query(query): Query<AnimeListQuery>,
) -> impl IntoResponse {
    let url = build_browse_url(state.animeflv.base_url(), &query);

    match state.animeflv.fetch_anime_list(&url).await {
        Ok(animes) => Json(AnimeListResponse {
            page: query.page,
            animes,
        })
        .into_response(),
        Err(animeflv::AnimeFlvError::Status(code)) => {
            tracing::warn!("Listing page {} returned HTTP {}", url, code);
            Json(listing_error_body(query.page)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch anime list from {}: {}", url, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(listing_error_body(query.page)),
            )
                .into_response()
        }
    }
}

/// The listing response keeps its `{page, animes}` envelope on scrape
/// failure; the error object takes the place of the entry list.
fn listing_error_body(page: u32) -> serde_json::Value {
    json!({
        "page": page,
        "animes": {"error": "could not retrieve data"},
    })
}

/// Extract the full detail record of one title
#[utoipa::path(
    get,
    path = "/details",
    tag = "anime",
    params(DetailQuery),
    responses(
        (status = 200, description = "Detail record with enriched episodes", body = animeflv::AnimeDetail)
    )
)]
pub async fn get_anime_details(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> impl IntoResponse {
    match state
        .animeflv
        .fetch_anime_details(&query.url, &query.content_type)
        .await
    {
        Ok(detail) => Json(detail).into_response(),
        Err(animeflv::AnimeFlvError::Status(code)) => {
            tracing::warn!("Detail page {} returned HTTP {}", query.url, code);
            Json(json!({"error": "could not retrieve data"})).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch details for {}: {}", query.url, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "could not retrieve data"})),
            )
                .into_response()
        }
    }
}

/// Build the upstream browse URL from the listing query. Repeated
/// filters use the site's bracketed keys; query spaces become `+`.
fn build_browse_url(base_url: &str, query: &AnimeListQuery) -> String {
    let mut params: Vec<(String, String)> = vec![("page".into(), query.page.to_string())];

    if let Some(q) = &query.query {
        params.push(("q".into(), q.replace(' ', "+")));
    }
    for year in &query.year {
        params.push((urlencoding::encode("year[]").into_owned(), year.to_string()));
    }
    for kind in &query.kinds {
        params.push((urlencoding::encode("type[]").into_owned(), kind.clone()));
    }
    for status in &query.status {
        params.push((
            urlencoding::encode("status[]").into_owned(),
            status.to_string(),
        ));
    }
    params.push(("order".into(), query.order.clone()));

    let query_string = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}/browse?{}", base_url, query_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> AnimeListQuery {
        AnimeListQuery {
            page: 2,
            query: Some("one piece".into()),
            year: vec![2023, 2024],
            kinds: vec!["tv".into()],
            status: vec![1],
            order: "rating".into(),
        }
    }

    #[test]
    fn test_build_browse_url() {
        let url = build_browse_url("https://example.net", &query());
        assert_eq!(
            url,
            "https://example.net/browse?page=2&q=one+piece&year%5B%5D=2023&year%5B%5D=2024&type%5B%5D=tv&status%5B%5D=1&order=rating"
        );
    }

    #[test]
    fn test_listing_error_keeps_response_envelope() {
        let body = listing_error_body(3);
        assert_eq!(body["page"], 3);
        assert_eq!(body["animes"]["error"], "could not retrieve data");
    }

    #[test]
    fn test_build_browse_url_minimal() {
        let query = AnimeListQuery {
            page: 1,
            query: None,
            year: vec![],
            kinds: vec![],
            status: vec![],
            order: "default".into(),
        };
        assert_eq!(
            build_browse_url("https://example.net", &query),
            "https://example.net/browse?page=1&order=default"
        );
    }
}
