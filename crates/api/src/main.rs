use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use promptory_core::session::ResultStore;
use promptory_webhook::WebhookClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptory_api::config::ServerConfig;
use promptory_api::router::build_app_router;
use promptory_api::sessions::{start_idle_sweeper, SessionRegistry};
use promptory_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "promptory_api=debug,promptory_webhook=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Webhook client ---
    let webhook =
        WebhookClient::new(config.webhook.clone()).expect("Failed to build webhook HTTP client");
    tracing::info!(
        url = %config.webhook.url,
        encoding = %config.webhook.encoding,
        timeout_secs = config.webhook.timeout.as_secs(),
        "Image webhook configured",
    );

    // --- Session registry and result store ---
    let sessions = Arc::new(SessionRegistry::new());
    let results = Arc::new(ResultStore::new());

    // --- Idle session sweeper ---
    let sweeper_handle = start_idle_sweeper(
        Arc::clone(&sessions),
        Arc::clone(&results),
        Duration::from_secs(config.session_idle_ttl_secs),
        Duration::from_secs(config.session_sweep_interval_secs),
    );
    tracing::info!(
        idle_ttl_secs = config.session_idle_ttl_secs,
        "Idle session sweeper started"
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::clone(&sessions),
        results: Arc::clone(&results),
        webhook: Arc::new(webhook),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_handle.abort();
    tracing::info!("Idle session sweeper stopped");

    let session_count = sessions.session_count().await;
    tracing::info!(session_count, "Tearing down remaining Try-On sessions");
    let cleanup = sessions.shutdown_all(&results);
    if tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), cleanup)
        .await
        .is_err()
    {
        tracing::warn!("Session teardown timed out");
    }

    let released = results.clear();
    tracing::info!(released, "Result store cleared");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
