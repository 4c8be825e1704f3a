/// Application settings
///
/// The gallery and all tunables are read from a JSON settings file in the
/// user's config directory, with image URLs optionally supplied on the
/// command line. A missing or unreadable file is not fatal: the viewer
/// falls back to defaults and logs what happened.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Delay before an error-triggered reload is attempted again, in ms
const DEFAULT_RETRY_DELAY_MS: u64 = 3000;

/// How long the notification stays visible after the count returns to 0, in ms
const DEFAULT_HIDE_DELAY_MS: u64 = 3000;

/// Images smaller than this pixel area get no hover menu
const DEFAULT_MENU_AREA_THRESHOLD: f32 = 40000.0;

/// Endpoint probed to maintain the cached connectivity flag
const DEFAULT_PROBE_URL: &str = "https://www.gstatic.com/generate_204";

/// Interval between connectivity probes, in ms
const DEFAULT_PROBE_INTERVAL_MS: u64 = 5000;

/// One image in the gallery
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryEntry {
    /// URL the image data is fetched from
    pub url: String,
    /// Displayed width in logical pixels (defaulted if absent)
    #[serde(default)]
    pub width: Option<f32>,
    /// Displayed height in logical pixels (defaulted if absent)
    #[serde(default)]
    pub height: Option<f32>,
}

impl GalleryEntry {
    /// Entry with default display dimensions
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }
}

/// All viewer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Images to show, in order
    pub images: Vec<GalleryEntry>,
    /// Delay before an error-triggered reload is attempted again
    pub retry_delay_ms: u64,
    /// How long the notification lingers once the reload count reaches 0
    pub hide_delay_ms: u64,
    /// Minimum height*width for an image to receive a hover menu
    pub menu_area_threshold: f32,
    /// Endpoint used to check network connectivity
    pub probe_url: String,
    /// Interval between connectivity probes
    pub probe_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            menu_area_threshold: DEFAULT_MENU_AREA_THRESHOLD,
            probe_url: DEFAULT_PROBE_URL.to_string(),
            probe_interval_ms: DEFAULT_PROBE_INTERVAL_MS,
        }
    }
}

/// Why settings could not be loaded
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid command line: {0}")]
    Cli(String),
}

impl Settings {
    /// Path of the settings file.
    ///
    /// - Linux: ~/.config/retry-viewer/settings.json
    /// - macOS: ~/Library/Application Support/retry-viewer/settings.json
    /// - Windows: %APPDATA%\retry-viewer\settings.json
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("retry-viewer");
        path.push("settings.json");
        Some(path)
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Settings assembled from the config file and command line.
    ///
    /// URLs given as free arguments are appended to the configured gallery;
    /// `--config <path>` points at an alternative settings file. Errors are
    /// logged and degrade to defaults rather than aborting startup.
    pub fn from_env() -> Self {
        let mut settings = match parse_cli() {
            Ok(cli) => {
                let path = cli.config.or_else(Self::config_path);
                let mut settings = match path {
                    Some(path) if path.exists() => match Self::load_from(&path) {
                        Ok(settings) => {
                            tracing::info!(path = %path.display(), "settings loaded");
                            settings
                        }
                        Err(err) => {
                            tracing::warn!(
                                path = %path.display(),
                                %err,
                                "could not load settings, using defaults"
                            );
                            Self::default()
                        }
                    },
                    _ => Self::default(),
                };
                settings
                    .images
                    .extend(cli.urls.into_iter().map(GalleryEntry::from_url));
                settings
            }
            Err(err) => {
                tracing::warn!(%err, "could not parse command line, using defaults");
                Self::default()
            }
        };

        if settings.probe_interval_ms == 0 {
            settings.probe_interval_ms = DEFAULT_PROBE_INTERVAL_MS;
        }
        settings
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

/// Command line arguments
struct CliArgs {
    config: Option<PathBuf>,
    urls: Vec<String>,
}

/// Parse `--config <path>` plus free image URLs
fn parse_cli() -> Result<CliArgs, SettingsError> {
    let mut args = pico_args::Arguments::from_env();

    let config = args
        .opt_value_from_str("--config")
        .map_err(|e| SettingsError::Cli(e.to_string()))?;

    let urls = args
        .finish()
        .into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| SettingsError::Cli(format!("invalid argument: {arg:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CliArgs { config, urls })
}
