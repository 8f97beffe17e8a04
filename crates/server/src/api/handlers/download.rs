use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::models::{DownloadAccepted, DownloadRequest};
use crate::services::AcquisitionError;
use crate::state::AppState;

/// Start a background download of a MEGA share link
#[utoipa::path(
    post,
    path = "/download",
    tag = "download",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Download accepted and running", body = DownloadAccepted),
        (status = 400, description = "URL is not a valid provider link"),
        (status = 500, description = "Provider session unavailable")
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> impl IntoResponse {
    match state
        .acquisition
        .start(request.url.clone(), request.session_id.clone())
        .await
    {
        // The handle is dropped on purpose: the job runs to completion
        // regardless of this request's lifetime.
        Ok(_handle) => Json(DownloadAccepted {
            message: "Download started".to_string(),
            url: request.url,
            session_id: request.session_id,
        })
        .into_response(),
        Err(AcquisitionError::InvalidUrl { provider }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("URL is not a valid {} link", provider)})),
        )
            .into_response(),
        Err(AcquisitionError::Provider(e)) => {
            tracing::error!("Provider unavailable: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Could not connect to the storage provider"})),
            )
                .into_response()
        }
    }
}
