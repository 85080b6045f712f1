//! TOML configuration for the soundmoji pipeline
//!
//! All sections are optional; missing fields fall back to the defaults below.
//! CLI flags override file values after loading.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output mode for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Annotated bar chart (PNG)
    Chart,
    /// One emoji per frame, centered (GIF)
    Slideshow,
    /// Emojis accumulating around a circle (GIF)
    Radial,
    /// Up to three emojis cascading along the diagonal (GIF)
    Diagonal,
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub assets: AssetsConfig,
    pub selection: SelectionConfig,
    pub audio: AudioConfig,
    pub render: RenderConfig,
}

/// Emoji asset store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// CSV file with `unicode` identifiers and per-vendor image columns
    pub emoji_csv: PathBuf,
    /// Which vendor column holds the encoded bitmaps
    pub image_column: String,
    /// Identifier of the fallback asset for unmapped labels
    pub default_emoji: String,
    /// TOML table mapping label strings to composite identifiers
    pub mapping: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            emoji_csv: PathBuf::from("emojiimage-dataset/full_emoji.csv"),
            image_column: "Apple".to_string(),
            default_emoji: "U+274C".to_string(),
            mapping: PathBuf::from("mapping.toml"),
        }
    }
}

/// Label selection configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Labels excluded from selection regardless of score
    pub denylist: Vec<String>,
}

/// Audio extraction configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Resample chunks to this rate; omit to keep the native rate
    pub sample_rate: Option<u32>,
}

/// Renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// Output file path (PNG for chart mode, GIF otherwise)
    pub output: PathBuf,
    /// Animation canvas width in pixels
    pub frame_width: u32,
    /// Animation canvas height in pixels
    pub frame_height: u32,
    /// Per-frame display time in milliseconds
    pub frame_delay_ms: u32,
    /// Circle radius in pixels (radial mode)
    pub circle_radius: u32,
    /// Emoji size as a fraction of each chart axis range (chart mode)
    pub emoji_fraction: f64,
    /// Number of ranked labels per frame (diagonal mode)
    pub diagonal_labels: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Chart,
            output: PathBuf::from("output/summary.png"),
            frame_width: 200,
            frame_height: 200,
            frame_delay_ms: 500,
            circle_radius: 70,
            emoji_fraction: 0.08,
            diagonal_labels: 3,
            chart_width: 1280,
            chart_height: 960,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Validate field ranges
    pub fn validate(&self) -> Result<()> {
        if self.render.frame_width == 0 || self.render.frame_height == 0 {
            return Err(Error::Config(
                "frame dimensions must be positive".to_string(),
            ));
        }
        if self.render.chart_width == 0 || self.render.chart_height == 0 {
            return Err(Error::Config(
                "chart dimensions must be positive".to_string(),
            ));
        }
        if self.render.emoji_fraction <= 0.0 || self.render.emoji_fraction > 1.0 {
            return Err(Error::Config(
                "emoji_fraction must be in (0, 1]".to_string(),
            ));
        }
        if self.render.diagonal_labels == 0 {
            return Err(Error::Config(
                "diagonal_labels must be at least 1".to_string(),
            ));
        }
        if let Some(rate) = self.audio.sample_rate {
            if rate == 0 {
                return Err(Error::Config("sample_rate must be positive".to_string()));
            }
        }
        Ok(())
    }
}
