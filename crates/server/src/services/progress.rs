use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};

use crate::models::{DownloadProgress, ProgressMessage};

/// How often the notifier polls for a fresh snapshot
const NOTIFY_INTERVAL: Duration = Duration::from_secs(1);

/// Process-wide keyed store of download-session snapshots.
///
/// Single writer per key (the owning acquisition job), single reader
/// per key (that session's notifier); the map itself is safe for
/// concurrent sessions. A session id submitted twice starts over: the
/// accept-time `insert` replaces whatever the earlier run left behind.
#[derive(Default)]
pub struct ProgressStore {
    sessions: RwLock<HashMap<String, DownloadProgress>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session unconditionally, replacing any snapshot a
    /// previous run with the same id left behind. Only the accepting
    /// service calls this; jobs go through `update`.
    pub async fn insert(&self, progress: DownloadProgress) {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&progress.session_id) {
            tracing::info!(
                "Session id {} reused, replacing {:?} snapshot",
                progress.session_id,
                existing.status
            );
        }
        sessions.insert(progress.session_id.clone(), progress);
    }

    /// Replace the snapshot for a session. A terminal snapshot is
    /// final: later updates for the same session are dropped so status
    /// can never regress.
    pub async fn update(&self, progress: DownloadProgress) {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&progress.session_id) {
            if existing.status.is_terminal() {
                tracing::warn!(
                    "Ignoring update for finished session {}: {:?}",
                    progress.session_id,
                    progress.status
                );
                return;
            }
        }
        sessions.insert(progress.session_id.clone(), progress);
    }

    pub async fn get(&self, session_id: &str) -> Option<DownloadProgress> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove terminal sessions whose last update is older than `ttl`.
    /// Live sessions are never evicted; their owning job will move
    /// them to a terminal state eventually.
    pub async fn evict_terminal(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, progress| {
            !(progress.status.is_terminal() && progress.updated_at.elapsed() >= ttl)
        });
        before - sessions.len()
    }

    /// Spawn the periodic eviction sweep.
    pub fn start_eviction(self: &Arc<Self>, interval: Duration, ttl: Duration) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                let evicted = store.evict_terminal(ttl).await;
                if evicted > 0 {
                    tracing::info!("Evicted {} finished download sessions", evicted);
                }
            }
        });
    }
}

/// Streams a session's snapshots to one subscriber.
pub struct ProgressNotifier;

impl ProgressNotifier {
    /// Poll the store once per second and forward the current snapshot
    /// until a terminal state has been delivered. A dropped receiver
    /// (subscriber went away) ends the loop silently.
    pub async fn run(
        store: Arc<ProgressStore>,
        session_id: String,
        tx: mpsc::Sender<ProgressMessage>,
    ) {
        loop {
            if let Some(progress) = store.get(&session_id).await {
                let terminal = progress.status.is_terminal();
                if tx.send(ProgressMessage::from(&progress)).await.is_err() {
                    tracing::debug!(
                        "Progress subscriber for {} disconnected early",
                        session_id
                    );
                    return;
                }
                if terminal {
                    return;
                }
            }
            tokio::time::sleep(NOTIFY_INTERVAL).await;
        }
    }
}
