//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument or its environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default (fallback)
//!
//! The TOML file itself is located by: explicit `--config` path, then the
//! `PODPLAY_CONFIG` environment variable, then the platform config directory
//! (`~/.config/podplay/config.toml` on Linux). A missing file at the platform
//! location is not an error; the player starts on defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "PODPLAY_CONFIG";

/// Compiled defaults used when neither CLI nor TOML provide a value
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub port: u16,
    pub log_level: String,
    pub initial_volume: f64,
    pub initial_playback_rate: f64,
    pub skip_seconds: f64,
    pub autoplay: bool,
    pub progress_interval_ms: u64,
    pub event_capacity: usize,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            port: 5741,
            log_level: "info".to_string(),
            initial_volume: 1.0,
            initial_playback_rate: 1.0,
            skip_seconds: 15.0,
            autoplay: false,
            progress_interval_ms: 250,
            event_capacity: 100,
        }
    }
}

/// On-disk configuration; every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub initial_volume: Option<f64>,
    pub initial_playback_rate: Option<f64>,
    pub skip_seconds: Option<f64>,
    pub autoplay: Option<bool>,
    pub progress_interval_ms: Option<u64>,
    pub event_capacity: Option<usize>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line (clap also folds environment
/// variables into these)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub autoplay: Option<bool>,
}

/// Fully resolved player configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub port: u16,
    pub log_level: String,
    pub initial_volume: f64,
    pub initial_playback_rate: f64,
    /// Step used by skip forward / skip backward
    pub skip_seconds: f64,
    /// Advance through the queue when an episode ends
    pub autoplay: bool,
    /// Time-update cadence of the headless resource
    pub progress_interval: Duration,
    /// Per-subscriber event buffer
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::default();
        Self {
            port: defaults.port,
            log_level: defaults.log_level,
            initial_volume: defaults.initial_volume,
            initial_playback_rate: defaults.initial_playback_rate,
            skip_seconds: defaults.skip_seconds,
            autoplay: defaults.autoplay,
            progress_interval: Duration::from_millis(defaults.progress_interval_ms),
            event_capacity: defaults.event_capacity,
        }
    }
}

impl PlayerConfig {
    /// Locate and load the TOML file, then merge it with overrides
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let toml = load_toml_config(overrides.config_path.as_deref())?;
        Self::from_sources(toml, overrides)
    }

    /// Merge an already-loaded TOML config with overrides and defaults
    pub fn from_sources(toml: Option<TomlConfig>, overrides: &ConfigOverrides) -> Result<Self> {
        let defaults = CompiledDefaults::default();
        let toml = toml.unwrap_or_default();

        let config = Self {
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            log_level: overrides
                .log_level
                .clone()
                .or(toml.log_level)
                .unwrap_or(defaults.log_level),
            initial_volume: toml.initial_volume.unwrap_or(defaults.initial_volume),
            initial_playback_rate: toml
                .initial_playback_rate
                .unwrap_or(defaults.initial_playback_rate),
            skip_seconds: toml.skip_seconds.unwrap_or(defaults.skip_seconds),
            autoplay: overrides.autoplay.or(toml.autoplay).unwrap_or(defaults.autoplay),
            progress_interval: Duration::from_millis(
                toml.progress_interval_ms.unwrap_or(defaults.progress_interval_ms),
            ),
            event_capacity: toml.event_capacity.unwrap_or(defaults.event_capacity),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::Config(format!(
                "initial_volume must be within 0.0-1.0 (got {})",
                self.initial_volume
            )));
        }
        if !self.initial_playback_rate.is_finite() || self.initial_playback_rate <= 0.0 {
            return Err(Error::Config(format!(
                "initial_playback_rate must be greater than 0 (got {})",
                self.initial_playback_rate
            )));
        }
        if !self.skip_seconds.is_finite() || self.skip_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "skip_seconds must be greater than 0 (got {})",
                self.skip_seconds
            )));
        }
        if self.progress_interval < Duration::from_millis(10) {
            return Err(Error::Config(format!(
                "progress_interval_ms must be at least 10 (got {})",
                self.progress_interval.as_millis()
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Platform config file location, e.g. `~/.config/podplay/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("podplay").join("config.toml"))
}

/// Load the TOML config, if any
///
/// An explicitly requested file (argument or `PODPLAY_CONFIG`) must exist.
/// The platform default location is optional.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<Option<TomlConfig>> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    if let Some(path) = requested {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("Loading config from {}", path.display());
        return TomlConfig::load(&path).map(Some);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            TomlConfig::load(&path).map(Some)
        }
        Some(path) => {
            warn!("No config file at {}, using defaults", path.display());
            Ok(None)
        }
        None => {
            warn!("Could not determine config directory, using defaults");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.port, 5741);
        assert_eq!(config.skip_seconds, 15.0);
        assert_eq!(config.progress_interval, Duration::from_millis(250));
        assert!(!config.autoplay);
    }

    #[test]
    fn test_overrides_beat_toml() {
        let toml = TomlConfig {
            port: Some(6000),
            autoplay: Some(false),
            log_level: Some("warn".to_string()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            port: Some(7000),
            autoplay: Some(true),
            ..Default::default()
        };

        let config = PlayerConfig::from_sources(Some(toml), &overrides).unwrap();
        assert_eq!(config.port, 7000);
        assert!(config.autoplay);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_values_rejected() {
        for toml in [
            TomlConfig { initial_volume: Some(1.5), ..Default::default() },
            TomlConfig { initial_playback_rate: Some(0.0), ..Default::default() },
            TomlConfig { skip_seconds: Some(-15.0), ..Default::default() },
            TomlConfig { progress_interval_ms: Some(1), ..Default::default() },
            TomlConfig { event_capacity: Some(0), ..Default::default() },
        ] {
            let result = PlayerConfig::from_sources(Some(toml.clone()), &ConfigOverrides::default());
            assert!(matches!(result, Err(Error::Config(_))), "accepted {:?}", toml);
        }
    }
}
