use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use promptory_core::error::CoreError;
use promptory_core::session::{RequestState, ResultStore, TryOnSession};
use promptory_core::types::{SessionId, Timestamp};
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one session. Handlers lock it only for state
/// transitions, never across the webhook call.
pub type SessionHandle = Arc<Mutex<TryOnSession>>;

/// A registered session plus the last time a request touched it.
struct SessionEntry {
    handle: SessionHandle,
    /// Unix milliseconds of the most recent lookup.
    last_seen_ms: AtomicI64,
}

impl SessionEntry {
    fn touch(&self, now: Timestamp) {
        self.last_seen_ms
            .store(now.timestamp_millis(), Ordering::Relaxed);
    }
}

/// Registry of live Try-On sessions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. Visitors rarely delete their session,
/// so idle sessions are reclaimed by [`SessionRegistry::evict_idle`].
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl SessionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a fresh session and return its ID.
    pub async fn create(&self) -> (SessionId, SessionHandle) {
        let id = uuid::Uuid::new_v4();
        let handle = Arc::new(Mutex::new(TryOnSession::new()));
        let entry = SessionEntry {
            handle: Arc::clone(&handle),
            last_seen_ms: AtomicI64::new(chrono::Utc::now().timestamp_millis()),
        };
        self.sessions.write().await.insert(id, entry);
        tracing::debug!(session_id = %id, "Try-On session created");
        (id, handle)
    }

    /// Look up a session by ID and mark it active.
    pub async fn get(&self, id: SessionId) -> Result<SessionHandle, CoreError> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or_else(|| not_found(id))?;
        entry.touch(chrono::Utc::now());
        Ok(Arc::clone(&entry.handle))
    }

    /// Remove a session and release everything it holds.
    ///
    /// A request still in flight for this session finds it torn down when
    /// it completes and its result is discarded.
    pub async fn remove(&self, id: SessionId, store: &ResultStore) -> Result<(), CoreError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| not_found(id))?;
        entry.handle.lock().await.teardown(store);
        tracing::debug!(session_id = %id, "Try-On session removed");
        Ok(())
    }

    /// Tear down and drop every session not looked up within `idle_ttl`
    /// of `now`. Returns the number of sessions evicted.
    ///
    /// Sessions that are locked by a handler or waiting on the webhook
    /// are left alone; they are picked up by a later sweep.
    pub async fn evict_idle(&self, idle_ttl: Duration, now: Timestamp, store: &ResultStore) -> usize {
        let ttl_ms = i64::try_from(idle_ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff_ms = now.timestamp_millis().saturating_sub(ttl_ms);

        let mut sessions = self.sessions.write().await;
        let stale: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, entry)| entry.last_seen_ms.load(Ordering::Relaxed) < cutoff_ms)
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = 0;
        for id in stale {
            let torn_down = match sessions.get(&id).map(|entry| entry.handle.try_lock()) {
                Some(Ok(mut session)) if session.state() != RequestState::Loading => {
                    session.teardown(store);
                    true
                }
                _ => false,
            };
            if torn_down {
                sessions.remove(&id);
                evicted += 1;
                tracing::debug!(session_id = %id, "Idle Try-On session evicted");
            }
        }
        evicted
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Tear down every session. Called during graceful shutdown.
    pub async fn shutdown_all(&self, store: &ResultStore) {
        let drained: Vec<SessionHandle> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, entry)| entry.handle)
            .collect();
        for handle in drained {
            handle.lock().await.teardown(store);
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a background task that evicts idle sessions every `interval`.
///
/// The task runs until aborted via the returned `JoinHandle`, which
/// happens during shutdown.
pub fn start_idle_sweeper(
    sessions: Arc<SessionRegistry>,
    results: Arc<ResultStore>,
    idle_ttl: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);

        loop {
            interval.tick().await;
            let evicted = sessions
                .evict_idle(idle_ttl, chrono::Utc::now(), &results)
                .await;
            if evicted > 0 {
                let remaining = sessions.session_count().await;
                tracing::info!(
                    evicted,
                    remaining,
                    stored_results = results.len(),
                    "Evicted idle Try-On sessions",
                );
            }
        }
    })
}

fn not_found(id: SessionId) -> CoreError {
    CoreError::NotFound {
        entity: "TryOnSession",
        id: id.to_string(),
    }
}
