use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tokio::sync::mpsc;

use crate::services::{ProgressNotifier, ProgressStore};
use crate::state::AppState;

/// Channel capacity between the notifier and the socket writer
const CHANNEL_CAPACITY: usize = 16;

/// Subscribe to a download session's progress over WebSocket.
/// Snapshots are pushed once per second until a terminal state, then
/// the socket is closed.
pub async fn progress_ws(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let store = Arc::clone(&state.store);
    ws.on_upgrade(move |socket| stream_progress(socket, store, session_id))
}

async fn stream_progress(mut socket: WebSocket, store: Arc<ProgressStore>, session_id: String) {
    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    let notifier = tokio::spawn(ProgressNotifier::run(store, session_id.clone(), tx));

    while let Some(message) = rx.recv().await {
        let Ok(payload) = serde_json::to_string(&message) else {
            continue;
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            // Dropping rx stops the notifier on its next send.
            tracing::debug!(
                "Client disconnected before the download finished: {}",
                session_id
            );
            break;
        }
    }
    drop(rx);

    let _ = socket.send(Message::Close(None)).await;
    let _ = notifier.await;
}
