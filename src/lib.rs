//! Juice Cafe itinerary
//!
//! Loads the cafe's multi-day activity feed, groups it into a browsable
//! calendar and exports the rendered calendar as a PNG image or a single-page
//! landscape PDF.
//!
//! # Features
//!
//! - **Schedule**: day-key parsing, per-day grouping and keyword color rules
//! - **Loader**: async fetch of the remote feed with the final-day fallback
//! - **View**: explicit UI state with a reducer, plus schedule markup
//! - **Export**: style snapshot/restore around a pluggable rasterizer and a
//!   PDF document generator
//!
//! # Example
//!
//! ```no_run
//! use juice_itinerary::{ItineraryConfig, loader::ScheduleLoader};
//!
//! # async fn run() -> juice_itinerary::Result<()> {
//! let loader = ScheduleLoader::new(ItineraryConfig::default())?;
//! let schedule = loader.load().await?;
//! for day in &schedule.days {
//!     println!("{} {}: {} activities", day.day_of_week, day.formatted_date, day.activities.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub mod export;
pub mod loader;
pub mod rendering;
pub mod schedule;
pub mod view;

pub use schedule::{Activity, DaySchedule};

/// Feed the cafe publishes its itinerary on.
pub const DEFAULT_SOURCE_URL: &str = "https://juice.hackclub.com/itinerary.json";

/// Configuration for loading and exporting the itinerary
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```
/// let cfg = juice_itinerary::ItineraryConfig::from_toml_str("timeout_ms = 5000").unwrap();
/// assert_eq!(cfg.timeout_ms, 5000);
/// assert_eq!(cfg.raster.pixel_ratio, 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItineraryConfig {
    /// URL of the JSON activity feed
    pub source_url: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Timeout for the feed request in milliseconds
    pub timeout_ms: u64,
    /// Directory exported files are written to
    pub output_dir: PathBuf,
    /// Layout viewport used by the built-in rasterizer
    pub viewport: Viewport,
    /// Rasterizer settings
    pub raster: RasterConfig,
    /// PDF page settings
    pub page: export::pdf::PageLayout,
    /// Upper bound for decoding the rasterized image during PDF export
    pub decode_timeout_ms: u64,
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: format!("juice-itinerary/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: 30000,
            output_dir: PathBuf::from("."),
            viewport: Viewport::default(),
            raster: RasterConfig::default(),
            page: export::pdf::PageLayout::default(),
            decode_timeout_ms: 10000,
        }
    }
}

impl ItineraryConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Reject values the loader or exporter cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.source_url)
            .map_err(|e| Error::ConfigError(format!("source_url {:?}: {}", self.source_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!("unsupported scheme {:?}", url.scheme())));
        }
        if self.timeout_ms == 0 || self.decode_timeout_ms == 0 {
            return Err(Error::ConfigError("timeouts must be non-zero".into()));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError("viewport must be non-empty".into()));
        }
        if self.raster.pixel_ratio == 0 || self.raster.pixel_ratio > 8 {
            return Err(Error::ConfigError(format!(
                "pixel_ratio must be within 1..=8, got {}",
                self.raster.pixel_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.raster.quality) {
            return Err(Error::ConfigError(format!(
                "quality must be within 0..=1, got {}",
                self.raster.quality
            )));
        }
        Ok(())
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Settings handed to the rasterizer on every export
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Device pixel ratio of the produced bitmap
    pub pixel_ratio: u32,
    /// Encoder quality between 0 and 1
    pub quality: f32,
    /// Background fill, as a CSS color
    pub background: String,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 2,
            quality: 1.0,
            background: "#ffffff".to_string(),
        }
    }
}
