use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/anime-list", get(handlers::get_anime_list))
        .route("/details", get(handlers::get_anime_details))
        .route("/download", post(handlers::start_download))
        .route("/ws/progress/{session_id}", get(handlers::progress_ws))
        .with_state(state)
}
