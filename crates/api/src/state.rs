use std::sync::Arc;

use promptory_core::session::ResultStore;
use promptory_webhook::ImageWebhook;

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Live Try-On sessions.
    pub sessions: Arc<SessionRegistry>,
    /// Decoded result images referenced by sessions.
    pub results: Arc<ResultStore>,
    /// The image-generation webhook.
    pub webhook: Arc<dyn ImageWebhook>,
}
