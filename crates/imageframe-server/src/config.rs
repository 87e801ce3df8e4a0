//! Server configuration.
//!
//! Every setting can be given as a flag or through its `IMAGEFRAME_*`
//! environment variable; the defaults reproduce the stock deployment
//! (port 5000, 30 s cooldown, no API key).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use imageframe_core::encode::DEFAULT_JPEG_QUALITY;
use imageframe_core::{EncodeError, FilterType, NormalizeOptions, OutputFormat};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_SERVER_URL: &str = "https://server_url";
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// Errors raised while turning a configuration into a running service.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid output path: {0}")]
    OutputPath(#[from] EncodeError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "imageframe-server",
    version,
    about = "Fetches a photo on request and renders it onto the frame canvas"
)]
pub struct ServerConfig {
    #[arg(long, env = "IMAGEFRAME_BIND", default_value = DEFAULT_BIND, help = "Address to listen on")]
    pub bind: SocketAddr,

    #[arg(
        long,
        env = "IMAGEFRAME_SERVER_URL",
        default_value = DEFAULT_SERVER_URL,
        help = "Base URL of the photo server; assets are read from <url>/<assetId>/original"
    )]
    pub server_url: String,

    #[arg(
        long,
        env = "IMAGEFRAME_API_KEY",
        default_value = "",
        hide_env_values = true,
        help = "Value sent in the x-api-key header"
    )]
    pub api_key: String,

    #[arg(
        long,
        env = "IMAGEFRAME_COOLDOWN_SECS",
        default_value_t = DEFAULT_COOLDOWN_SECS,
        help = "Minimum seconds between two accepted runs"
    )]
    pub cooldown_secs: u64,

    #[arg(long, env = "IMAGEFRAME_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "IMAGEFRAME_RUN_TIMEOUT_SECS", default_value_t = DEFAULT_RUN_TIMEOUT_SECS)]
    pub run_timeout_secs: u64,

    #[arg(
        long,
        env = "IMAGEFRAME_OUTPUT_PATH",
        help = "Write the finished canvas here (.png, .jpg or .jpeg); discarded when unset"
    )]
    pub output_path: Option<PathBuf>,

    #[arg(
        long,
        env = "IMAGEFRAME_JPEG_QUALITY",
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub jpeg_quality: u8,

    #[arg(
        long,
        env = "IMAGEFRAME_FILTER",
        default_value = "bicubic",
        help = "Resize filter: nearest, bilinear, bicubic or lanczos3"
    )]
    pub filter: FilterType,

    #[arg(
        long,
        env = "IMAGEFRAME_APPLY_EXIF_ORIENTATION",
        help = "Rotate sources by their EXIF orientation tag before laying them out"
    )]
    pub apply_exif_orientation: bool,

    #[arg(
        long,
        env = "IMAGEFRAME_STRICT_STATUS",
        help = "Answer failed runs with 5xx instead of 200"
    )]
    pub strict_status: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_key: String::new(),
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            output_path: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            filter: FilterType::default(),
            apply_exif_orientation: false,
            strict_status: false,
        }
    }
}

impl ServerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            filter: self.filter,
            apply_exif_orientation: self.apply_exif_orientation,
        }
    }

    /// Output destination and format, if a path is configured.
    pub fn output_target(&self) -> Result<Option<(PathBuf, OutputFormat)>, ConfigError> {
        match &self.output_path {
            Some(path) => {
                let format = OutputFormat::from_path(path, self.jpeg_quality)?;
                Ok(Some((path.clone(), format)))
            }
            None => Ok(None),
        }
    }
}
