//! HTTP request handlers
//!
//! Each control endpoint forwards to the player task and answers with the
//! session snapshot taken right after the command was applied.

use crate::api::server::AppContext;
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use podplay_common::{SessionSnapshot, TrackRef, PLAYBACK_RATES};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<StatusResponse>)>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BuildInfoResponse {
    version: String,
    git_hash: String,
    build_timestamp: String,
    build_profile: String,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    /// Seconds
    position: f64,
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    /// Seconds; the configured step when omitted
    seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    /// 0.0-1.0; out-of-range values are clamped
    volume: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VolumeResponse {
    pub volume: f64,
    pub is_muted: bool,
    pub effective_volume: f64,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    rate: f64,
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    rates: Vec<f64>,
    current: f64,
}

#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    tracks: Vec<TrackRef>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    queue: Vec<Arc<TrackRef>>,
    current_index: usize,
}

impl From<&SessionSnapshot> for VolumeResponse {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            volume: snapshot.playback.volume,
            is_muted: snapshot.playback.is_muted,
            effective_volume: snapshot.playback.effective_volume(),
        }
    }
}

impl From<SessionSnapshot> for QueueResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            queue: snapshot.queue,
            current_index: snapshot.current_index,
        }
    }
}

fn error_response(e: Error) -> (StatusCode, Json<StatusResponse>) {
    let status = match &e {
        Error::PlayerClosed => StatusCode::SERVICE_UNAVAILABLE,
        Error::BadRequest(_) | Error::Common(podplay_common::Error::InvalidInput(_)) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Rejected request: {}", e);
    }

    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

fn snapshot_result(result: crate::Result<SessionSnapshot>) -> ApiResult<SessionSnapshot> {
    result.map(Json).map_err(error_response)
}

// ============================================================================
// Health and Build Info
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "podplay_player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /build_info - Build identification captured by build.rs
pub async fn get_build_info() -> Json<BuildInfoResponse> {
    Json(BuildInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("PODPLAY_GIT_HASH").to_string(),
        build_timestamp: env!("PODPLAY_BUILD_TIMESTAMP").to_string(),
        build_profile: env!("PODPLAY_BUILD_PROFILE").to_string(),
    })
}

// ============================================================================
// Playback Endpoints
// ============================================================================

/// GET /api/v1/playback/state - Current session snapshot
pub async fn get_state(State(ctx): State<AppContext>) -> Json<SessionSnapshot> {
    Json(ctx.player.snapshot())
}

/// POST /api/v1/playback/track - Load a track and start it
pub async fn play_track(
    State(ctx): State<AppContext>,
    Json(track): Json<TrackRef>,
) -> ApiResult<SessionSnapshot> {
    info!("Play track request: {}", track.episode_id());
    snapshot_result(ctx.player.play_track(track).await)
}

/// POST /api/v1/playback/play
pub async fn play(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.play().await)
}

/// POST /api/v1/playback/pause
pub async fn pause(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.pause().await)
}

/// POST /api/v1/playback/toggle
pub async fn toggle_play_pause(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.toggle_play_pause().await)
}

/// POST /api/v1/playback/seek - Position is clamped to the track duration
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.seek(req.position).await)
}

/// POST /api/v1/playback/skip_forward - Optional body `{"seconds": n}`
pub async fn skip_forward(
    State(ctx): State<AppContext>,
    req: Option<Json<SkipRequest>>,
) -> ApiResult<SessionSnapshot> {
    let seconds = req.and_then(|Json(req)| req.seconds);
    snapshot_result(ctx.player.skip_forward(seconds).await)
}

/// POST /api/v1/playback/skip_backward - Optional body `{"seconds": n}`
pub async fn skip_backward(
    State(ctx): State<AppContext>,
    req: Option<Json<SkipRequest>>,
) -> ApiResult<SessionSnapshot> {
    let seconds = req.and_then(|Json(req)| req.seconds);
    snapshot_result(ctx.player.skip_backward(seconds).await)
}

/// POST /api/v1/playback/error/clear
pub async fn clear_error(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.clear_error().await)
}

/// POST /api/v1/playback/reset
pub async fn reset(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    info!("Reset request");
    snapshot_result(ctx.player.reset().await)
}

// ============================================================================
// Output Endpoints
// ============================================================================

/// GET /api/v1/audio/volume
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    Json(VolumeResponse::from(&ctx.player.snapshot()))
}

/// POST /api/v1/audio/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> ApiResult<VolumeResponse> {
    ctx.player
        .set_volume(req.volume)
        .await
        .map(|snapshot| Json(VolumeResponse::from(&snapshot)))
        .map_err(error_response)
}

/// POST /api/v1/audio/mute - Toggle mute; stored volume is kept
pub async fn toggle_mute(State(ctx): State<AppContext>) -> ApiResult<VolumeResponse> {
    ctx.player
        .toggle_mute()
        .await
        .map(|snapshot| Json(VolumeResponse::from(&snapshot)))
        .map_err(error_response)
}

/// POST /api/v1/audio/rate
pub async fn set_playback_rate(
    State(ctx): State<AppContext>,
    Json(req): Json<RateRequest>,
) -> ApiResult<SessionSnapshot> {
    if !req.rate.is_finite() || req.rate <= 0.0 {
        return Err(error_response(Error::BadRequest(format!(
            "playback rate must be greater than 0 (got {})",
            req.rate
        ))));
    }
    snapshot_result(ctx.player.set_playback_rate(req.rate).await)
}

/// GET /api/v1/audio/rates - Rates offered by rate pickers
pub async fn get_rates(State(ctx): State<AppContext>) -> Json<RatesResponse> {
    Json(RatesResponse {
        rates: PLAYBACK_RATES.to_vec(),
        current: ctx.player.snapshot().playback.playback_rate,
    })
}

// ============================================================================
// Queue Endpoints
// ============================================================================

/// GET /api/v1/queue
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<QueueResponse> {
    Json(QueueResponse::from(ctx.player.snapshot()))
}

/// POST /api/v1/queue - Replace the queue; index returns to 0
pub async fn set_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<QueueRequest>,
) -> ApiResult<QueueResponse> {
    info!("Set queue request: {} tracks", req.tracks.len());
    ctx.player
        .set_queue(req.tracks)
        .await
        .map(|snapshot| Json(QueueResponse::from(snapshot)))
        .map_err(error_response)
}

/// POST /api/v1/queue/enqueue - Append a track
pub async fn enqueue(
    State(ctx): State<AppContext>,
    Json(track): Json<TrackRef>,
) -> ApiResult<QueueResponse> {
    ctx.player
        .enqueue(track)
        .await
        .map(|snapshot| Json(QueueResponse::from(snapshot)))
        .map_err(error_response)
}

/// DELETE /api/v1/queue/:episode_id
pub async fn dequeue(
    State(ctx): State<AppContext>,
    Path(episode_id): Path<String>,
) -> ApiResult<QueueResponse> {
    ctx.player
        .dequeue(episode_id)
        .await
        .map(|snapshot| Json(QueueResponse::from(snapshot)))
        .map_err(error_response)
}

/// POST /api/v1/queue/next - Advance and play; no-op at the end
pub async fn play_next(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.play_next().await)
}

/// POST /api/v1/queue/previous - Step back and play; no-op at the start
pub async fn play_previous(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.play_previous().await)
}

/// POST /api/v1/queue/play/:index
pub async fn play_queue_index(
    State(ctx): State<AppContext>,
    Path(index): Path<usize>,
) -> ApiResult<SessionSnapshot> {
    let queue_len = ctx.player.snapshot().queue.len();
    if index >= queue_len {
        return Err((
            StatusCode::NOT_FOUND,
            Json(StatusResponse {
                status: format!("error: queue index {} out of range ({} entries)", index, queue_len),
            }),
        ));
    }
    snapshot_result(ctx.player.play_queue_index(index).await)
}

// ============================================================================
// Presentation Endpoints
// ============================================================================

/// POST /api/v1/player/minimize - Toggle the mini player
pub async fn toggle_minimized(State(ctx): State<AppContext>) -> ApiResult<SessionSnapshot> {
    snapshot_result(ctx.player.toggle_minimized().await)
}
