//! Source probing
//!
//! Decides whether a locator can be played and, where the container says so,
//! how long it is. Local files are opened with symphonia; remote sources are
//! checked for reachability only.

use crate::playback::ResourceError;
use reqwest::header::RANGE;
use reqwest::StatusCode;
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Container extensions accepted for episode audio
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "wav", "m4a", "aac", "ogg"];

/// Where a locator points
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(String),
    Unsupported(String),
}

impl SourceLocation {
    pub fn parse(locator: &str) -> Self {
        if let Some(path) = locator.strip_prefix("file://") {
            return SourceLocation::Local(PathBuf::from(path));
        }
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return SourceLocation::Remote(locator.to_string());
        }
        if locator.contains("://") || locator.is_empty() {
            return SourceLocation::Unsupported(locator.to_string());
        }
        SourceLocation::Local(PathBuf::from(locator))
    }
}

/// Probe `locator`; `Ok(Some(d))` when the duration is known
pub async fn probe_source(
    client: &reqwest::Client,
    locator: &str,
) -> Result<Option<f64>, ResourceError> {
    match SourceLocation::parse(locator) {
        SourceLocation::Local(path) => tokio::task::spawn_blocking(move || probe_file(&path))
            .await
            .map_err(|e| ResourceError::SourceFailed(format!("Probe task failed: {}", e)))?,
        SourceLocation::Remote(url) => {
            check_remote(client, &url).await?;
            debug!("Remote source reachable: {}", url);
            Ok(None)
        }
        SourceLocation::Unsupported(locator) => Err(ResourceError::SourceFailed(format!(
            "Unsupported locator: {}",
            locator
        ))),
    }
}

/// Confirm a remote source answers
///
/// Some CDNs refuse HEAD outright, so a 403 or 405 is retried as a one-byte
/// ranged GET.
async fn check_remote(client: &reqwest::Client, url: &str) -> Result<(), ResourceError> {
    let response = client
        .head(url)
        .send()
        .await
        .map_err(|e| ResourceError::Network(e.to_string()))?;

    let status = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::FORBIDDEN => {
            debug!("HEAD {} refused ({}), retrying with ranged GET", url, response.status());
            client
                .get(url)
                .header(RANGE, "bytes=0-0")
                .send()
                .await
                .map_err(|e| ResourceError::Network(e.to_string()))?
                .status()
        }
        status => status,
    };

    if status.is_success() {
        Ok(())
    } else {
        Err(ResourceError::Network(format!("{} returned {}", url, status)))
    }
}

/// Open a local file and read its duration from the container
pub fn probe_file(path: &Path) -> Result<Option<f64>, ResourceError> {
    let file = File::open(path).map_err(|e| {
        ResourceError::SourceFailed(format!("Cannot open {}: {}", path.display(), e))
    })?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        if !SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return Err(ResourceError::Decode(format!(
                "{}: .{} files are not supported",
                path.display(),
                ext
            )));
        }
        hint.with_extension(ext);
    }

    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| ResourceError::Decode(format!("{}: {}", path.display(), e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ResourceError::Decode(format!("{}: no audio track", path.display())))?;

    let params = &track.codec_params;
    symphonia::default::get_codecs()
        .make(params, &DecoderOptions::default())
        .map_err(|e| ResourceError::Decode(format!("{}: {}", path.display(), e)))?;

    let duration = match (params.n_frames, params.time_base, params.sample_rate) {
        (Some(frames), Some(time_base), _) => {
            let time = time_base.calc_time(frames);
            Some(time.seconds as f64 + time.frac)
        }
        (Some(frames), None, Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
        _ => None,
    };

    debug!("Probed {}: duration {:?}", path.display(), duration);
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method};
    use axum::routing::any;
    use axum::Router;

    /// Serve `router` on an ephemeral local port; returns the base URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Answers HEAD with `head_status` and ranged GETs with 206
    fn cdn(head_status: u16) -> Router {
        Router::new().route(
            "/ep.mp3",
            any(move |method: Method, headers: HeaderMap| async move {
                let status = if method == Method::HEAD {
                    head_status
                } else if headers.get("range").is_some() {
                    206
                } else {
                    200
                };
                axum::http::StatusCode::from_u16(status).unwrap()
            }),
        )
    }

    #[tokio::test]
    async fn test_remote_reachable_by_head() {
        let base = serve(cdn(200)).await;
        let client = reqwest::Client::new();

        let result = probe_source(&client, &format!("{}/ep.mp3", base)).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_remote_refusing_head_falls_back_to_ranged_get() {
        let client = reqwest::Client::new();
        for head_status in [403, 405] {
            let base = serve(cdn(head_status)).await;
            let result = probe_source(&client, &format!("{}/ep.mp3", base)).await;
            assert_eq!(result, Ok(None), "HEAD answered {}", head_status);
        }
    }

    #[tokio::test]
    async fn test_remote_not_found_is_network_error() {
        let base = serve(cdn(200)).await;
        let client = reqwest::Client::new();

        let result = probe_source(&client, &format!("{}/missing.mp3", base)).await;
        assert!(matches!(result, Err(ResourceError::Network(_))));
    }

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            SourceLocation::parse("file:///tmp/a.mp3"),
            SourceLocation::Local(PathBuf::from("/tmp/a.mp3"))
        );
        assert_eq!(
            SourceLocation::parse("/srv/ep.wav"),
            SourceLocation::Local(PathBuf::from("/srv/ep.wav"))
        );
        assert!(matches!(
            SourceLocation::parse("https://cdn.example/ep.mp3"),
            SourceLocation::Remote(_)
        ));
        assert!(matches!(
            SourceLocation::parse("ftp://host/ep.mp3"),
            SourceLocation::Unsupported(_)
        ));
        assert!(matches!(SourceLocation::parse(""), SourceLocation::Unsupported(_)));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = probe_file(Path::new("/nonexistent/podplay/episode.mp3"));
        assert!(matches!(result, Err(ResourceError::SourceFailed(_))));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode.txt");
        std::fs::write(&path, b"transcript").unwrap();

        assert!(matches!(probe_file(&path), Err(ResourceError::Decode(_))));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(matches!(probe_file(&path), Err(ResourceError::Decode(_))));
    }

    #[test]
    fn test_wav_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..16000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let duration = probe_file(&path).unwrap().expect("wav has a duration");
        assert!((duration - 2.0).abs() < 0.01, "duration {}", duration);
    }
}
