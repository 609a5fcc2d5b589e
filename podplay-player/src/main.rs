//! Podcast Player (podplay-player) - Main entry point
//!
//! Runs the playback engine as a service: one player task owning the
//! session, a headless audio resource, and the HTTP/SSE control API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use podplay_common::config::{ConfigOverrides, PlayerConfig};
use podplay_common::human_time::format_duration;
use podplay_player::{api, PlayerHandle};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for podplay-player
#[derive(Parser, Debug)]
#[command(name = "podplay-player")]
#[command(about = "Podcast playback engine with HTTP control API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PODPLAY_PORT")]
    port: Option<u16>,

    /// Config file (defaults to PODPLAY_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "PODPLAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Play the next queued episode when one ends
    #[arg(long)]
    autoplay: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            autoplay: self.autoplay.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlayerConfig::resolve(&args.overrides()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "podplay_player={level},podplay_common={level},tower_http=debug",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting podplay player v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Volume {:.2}, rate {}x, skip {}, autoplay {}",
        config.initial_volume,
        config.initial_playback_rate,
        format_duration(config.skip_seconds),
        config.autoplay
    );

    let port = config.port;
    let player = PlayerHandle::spawn(config);

    api::run(player, port, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
