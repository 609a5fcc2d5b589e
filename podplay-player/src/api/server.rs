//! HTTP server setup and routing
//!
//! Sets up the Axum router for control endpoints and SSE.
//!
//! Base URL: `http://localhost:5741` (configurable)

use crate::error::{Error, Result};
use crate::player::PlayerHandle;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{handlers, sse};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub player: PlayerHandle,
}

/// Build the router with all routes attached
pub fn create_router(ctx: AppContext) -> Router {
    let api = Router::new()
        // Playback control
        .route("/playback/state", get(handlers::get_state))
        .route("/playback/track", post(handlers::play_track))
        .route("/playback/play", post(handlers::play))
        .route("/playback/pause", post(handlers::pause))
        .route("/playback/toggle", post(handlers::toggle_play_pause))
        .route("/playback/seek", post(handlers::seek))
        .route("/playback/skip_forward", post(handlers::skip_forward))
        .route("/playback/skip_backward", post(handlers::skip_backward))
        .route("/playback/error/clear", post(handlers::clear_error))
        .route("/playback/reset", post(handlers::reset))
        // Output
        .route("/audio/volume", get(handlers::get_volume).post(handlers::set_volume))
        .route("/audio/mute", post(handlers::toggle_mute))
        .route("/audio/rate", post(handlers::set_playback_rate))
        .route("/audio/rates", get(handlers::get_rates))
        // Queue
        .route("/queue", get(handlers::get_queue).post(handlers::set_queue))
        .route("/queue/enqueue", post(handlers::enqueue))
        .route("/queue/next", post(handlers::play_next))
        .route("/queue/previous", post(handlers::play_previous))
        .route("/queue/play/:index", post(handlers::play_queue_index))
        .route("/queue/:episode_id", delete(handlers::dequeue))
        // Presentation
        .route("/player/minimize", post(handlers::toggle_minimized))
        // SSE event stream
        .route("/events", get(sse::event_stream));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/build_info", get(handlers::get_build_info))
        .nest("/api/v1", api)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for browser-based players on other origins
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until `shutdown` resolves
pub async fn run<F>(player: PlayerHandle, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(AppContext { player });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
