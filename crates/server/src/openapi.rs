use utoipa::OpenApi;

use crate::api::handlers;
use crate::models::{
    AnimeListResponse, DownloadAccepted, DownloadRequest, DownloadStatus, ProgressMessage,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Anime Acquisition API",
        version = "1.0.0"
    ),
    paths(
        handlers::anime::get_anime_list,
        handlers::anime::get_anime_details,
        handlers::download::start_download
    ),
    tags(
        (name = "anime", description = "Listing and detail extraction endpoints"),
        (name = "download", description = "Background download endpoints")
    ),
    components(schemas(
        animeflv::AnimeSummary,
        animeflv::AnimeDetail,
        animeflv::AiringStatus,
        animeflv::EpisodeDetail,
        animeflv::DownloadLink,
        AnimeListResponse,
        DownloadRequest,
        DownloadAccepted,
        DownloadStatus,
        ProgressMessage
    ))
)]
pub struct ApiDoc;
