//! Integration tests for the podplay player HTTP API
//!
//! Tests the complete API surface including:
//! - Health and build info
//! - Playback control and clamping
//! - Output (volume, mute, rate)
//! - Queue management
//! - Error mapping (400, 404, 422, 503)

mod helpers;

use axum::body::Body;
use axum::http::StatusCode;
use helpers::ResourceProbe;
use http::{Method, Request};
use podplay_common::config::PlayerConfig;
use podplay_player::api::{create_router, AppContext};
use podplay_player::playback::AudioResource;
use podplay_player::PlayerHandle;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Test helper to create a router backed by a recording resource
fn setup_test_server() -> (axum::Router, ResourceProbe) {
    let probe = ResourceProbe::new();
    let factory_probe = probe.clone();
    let player = PlayerHandle::spawn_with_resource(PlayerConfig::default(), move |_events| {
        factory_probe.build()
    });

    (create_router(AppContext { player }), probe)
}

/// Helper function to make HTTP requests to the test server
async fn make_request(
    app: &axum::Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder().method(method).uri(path);

    let request = match body {
        Some(json_body) => {
            request = request.header("content-type", "application/json");
            request.body(Body::from(json_body.to_string())).unwrap()
        }
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    // Extractor rejections answer with plain text
    (status, serde_json::from_slice(&body).ok())
}

fn track_json(episode_id: &str, duration: f64) -> Value {
    json!({
        "episode_id": episode_id,
        "podcast_id": "podcast-1",
        "audio_url": format!("https://cdn.example/{}.mp3", episode_id),
        "nominal_duration": duration,
        "title": format!("Episode {}", episode_id),
        "podcast_title": "Test Podcast",
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_test_server();

    let (status, body) = make_request(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "podplay_player");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let (app, _) = setup_test_server();

    let (status, body) = make_request(&app, Method::GET, "/build_info", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    for field in ["version", "git_hash", "build_timestamp", "build_profile"] {
        assert!(body[field].is_string(), "missing {}", field);
    }
}

#[tokio::test]
async fn test_initial_state() {
    let (app, probe) = setup_test_server();

    let (status, body) = make_request(&app, Method::GET, "/api/v1/playback/state", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert!(body["current"].is_null());
    assert_eq!(body["playback"]["is_playing"], false);
    assert_eq!(body["playback"]["volume"], 1.0);
    assert_eq!(probe.creations(), 0, "resource is created on first use");
}

#[tokio::test]
async fn test_play_track_then_toggle() {
    let (app, probe) = setup_test_server();

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/playback/track",
        Some(track_json("ep-1", 1800.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["current"]["episode_id"], "ep-1");
    assert_eq!(body["playback"]["is_playing"], true);
    assert_eq!(body["playback"]["duration"], 1800.0);
    assert_eq!(probe.sources().len(), 1);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/toggle", None).await;
    assert_eq!(body.unwrap()["playback"]["is_playing"], false);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/play", None).await;
    assert_eq!(body.unwrap()["playback"]["is_playing"], true);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/pause", None).await;
    assert_eq!(body.unwrap()["playback"]["is_playing"], false);

    // Reads through the state endpoint agree with the command replies
    let (_, body) = make_request(&app, Method::GET, "/api/v1/playback/state", None).await;
    assert_eq!(body.unwrap()["playback"]["is_playing"], false);
}

#[tokio::test]
async fn test_invalid_track_rejected() {
    let (app, _) = setup_test_server();

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/playback/track",
        Some(track_json("", 60.0)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["status"].as_str().unwrap().starts_with("error"));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (app, _) = setup_test_server();

    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/v1/playback/seek",
        Some(json!({ "position": "halfway" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_seek_and_skip_are_clamped() {
    let (app, _) = setup_test_server();
    make_request(
        &app,
        Method::POST,
        "/api/v1/playback/track",
        Some(track_json("ep-1", 100.0)),
    )
    .await;

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/playback/seek",
        Some(json!({ "position": 150.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["playback"]["current_time"], 100.0);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/skip_backward", None).await;
    assert_eq!(body.unwrap()["playback"]["current_time"], 85.0);

    let (_, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/playback/skip_backward",
        Some(json!({ "seconds": 100.0 })),
    )
    .await;
    assert_eq!(body.unwrap()["playback"]["current_time"], 0.0);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/skip_forward", None).await;
    assert_eq!(body.unwrap()["playback"]["current_time"], 15.0);
}

#[tokio::test]
async fn test_volume_and_mute() {
    let (app, probe) = setup_test_server();

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/audio/volume",
        Some(json!({ "volume": 1.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["volume"], 1.0);

    make_request(
        &app,
        Method::POST,
        "/api/v1/audio/volume",
        Some(json!({ "volume": 0.6 })),
    )
    .await;

    let (_, body) = make_request(&app, Method::POST, "/api/v1/audio/mute", None).await;
    let body = body.unwrap();
    assert_eq!(body["volume"], 0.6);
    assert_eq!(body["is_muted"], true);
    assert_eq!(body["effective_volume"], 0.0);
    assert_eq!(probe.last_volume(), Some(0.0));

    let (_, body) = make_request(&app, Method::GET, "/api/v1/audio/volume", None).await;
    assert_eq!(body.unwrap()["is_muted"], true);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/audio/mute", None).await;
    assert_eq!(body.unwrap()["effective_volume"], 0.6);
    assert_eq!(probe.last_volume(), Some(0.6));
}

#[tokio::test]
async fn test_playback_rate() {
    let (app, probe) = setup_test_server();

    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/v1/audio/rate",
        Some(json!({ "rate": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/audio/rate",
        Some(json!({ "rate": 1.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["playback"]["playback_rate"], 1.5);
    assert_eq!(probe.last_rate(), Some(1.5));

    let (_, body) = make_request(&app, Method::GET, "/api/v1/audio/rates", None).await;
    let body = body.unwrap();
    assert_eq!(body["rates"].as_array().unwrap().len(), 7);
    assert_eq!(body["current"], 1.5);
}

#[tokio::test]
async fn test_queue_management() {
    let (app, _) = setup_test_server();

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/queue",
        Some(json!({ "tracks": [track_json("a", 10.0), track_json("b", 20.0)] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["queue"].as_array().unwrap().len(), 2);
    assert_eq!(body["current_index"], 0);

    let (_, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/queue/enqueue",
        Some(track_json("c", 30.0)),
    )
    .await;
    assert_eq!(body.unwrap()["queue"].as_array().unwrap().len(), 3);

    let (status, body) = make_request(&app, Method::POST, "/api/v1/queue/play/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["current"]["episode_id"], "b");

    let (_, body) = make_request(&app, Method::POST, "/api/v1/queue/next", None).await;
    let body = body.unwrap();
    assert_eq!(body["current"]["episode_id"], "c");
    assert_eq!(body["current_index"], 2);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/queue/previous", None).await;
    assert_eq!(body.unwrap()["current"]["episode_id"], "b");

    let (status, body) = make_request(&app, Method::DELETE, "/api/v1/queue/a", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["queue"].as_array().unwrap().len(), 2);
    assert_eq!(body["current_index"], 0);

    let (status, _) = make_request(&app, Method::POST, "/api/v1/queue/play/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = make_request(&app, Method::GET, "/api/v1/queue", None).await;
    assert_eq!(body.unwrap()["queue"][0]["episode_id"], "b");
}

#[tokio::test]
async fn test_minimize_and_reset() {
    let (app, _) = setup_test_server();
    make_request(
        &app,
        Method::POST,
        "/api/v1/playback/track",
        Some(track_json("ep-1", 60.0)),
    )
    .await;

    let (_, body) = make_request(&app, Method::POST, "/api/v1/player/minimize", None).await;
    assert_eq!(body.unwrap()["is_minimized"], true);

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/reset", None).await;
    let body = body.unwrap();
    assert!(body["current"].is_null());
    assert_eq!(body["is_minimized"], false);
    assert_eq!(body["playback"]["is_playing"], false);
}

#[tokio::test]
async fn test_failed_start_reported_in_state() {
    let (app, probe) = setup_test_server();
    probe.fail_play_with(Some(podplay_player::playback::ResourceError::StartDenied(
        "output busy".to_string(),
    )));

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/api/v1/playback/track",
        Some(track_json("ep-1", 60.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["playback"]["is_playing"], false);
    assert_eq!(body["playback"]["error"], "Playback start denied: output busy");

    let (_, body) = make_request(&app, Method::POST, "/api/v1/playback/error/clear", None).await;
    assert!(body.unwrap()["playback"].get("error").is_none());
}

#[tokio::test]
async fn test_event_stream_headers() {
    let (app, _) = setup_test_server();

    let request = Request::builder()
        .uri("/api/v1/events")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );
}

#[tokio::test]
async fn test_dead_player_returns_service_unavailable() {
    let player = PlayerHandle::spawn_with_resource(
        PlayerConfig::default(),
        |_events| -> Box<dyn AudioResource> { panic!("no audio output in this test") },
    );
    let app = create_router(AppContext { player });

    // Creating the resource kills the player task
    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/v1/audio/volume",
        Some(json!({ "volume": 0.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = make_request(&app, Method::POST, "/api/v1/playback/pause", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
