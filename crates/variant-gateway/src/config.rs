//! Environment-driven configuration for the gateway binary
//!
//! Every setting has a default, so the service starts with no environment at
//! all. Parsing goes through a lookup function so tests can supply variables
//! without touching the process environment.

use image_deriver::DEFAULT_JPEG_QUALITY;
use std::path::PathBuf;

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub origin_dir: PathBuf,
    pub derived_dir: PathBuf,
    pub jpeg_quality: u8,
    pub max_upload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            origin_dir: PathBuf::from("./data/original"),
            derived_dir: PathBuf::from("./data/compressed"),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl GatewayConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = var("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let origin_dir = var("ORIGIN_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.origin_dir);

        let derived_dir = var("DERIVED_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.derived_dir);

        let jpeg_quality = var("JPEG_QUALITY")
            .and_then(|s| s.parse::<u8>().ok())
            .map(|q| q.clamp(1, 100))
            .unwrap_or(defaults.jpeg_quality);

        let max_upload_bytes = var("MAX_UPLOAD_BYTES")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            port,
            origin_dir,
            derived_dir,
            jpeg_quality,
            max_upload_bytes,
        }
    }
}
