//! Display configuration - overlay appearance, stamp wording, BGM files.

use serde::{Deserialize, Serialize};

/// Options for the streaming overlay document.
///
/// Values are taken as written; the overlay renderer falls back to its own
/// defaults for anything it cannot use (bad size strings, non-positive scale,
/// unknown theme ids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Canvas size as `WIDTHxHEIGHT` in pixels.
    /// Default: 800x600
    #[serde(default = "OverlayConfig::default_size")]
    pub size: String,

    /// Multiplier applied to every font size.
    /// Default: 1.5
    #[serde(default = "OverlayConfig::default_font_scale")]
    pub font_scale: f64,

    /// Color theme id (pastel_pink, pastel_orange, pastel_blue, pastel_green,
    /// pastel_lavender, dark).
    /// Default: pastel_blue
    #[serde(default = "OverlayConfig::default_theme")]
    pub theme: String,

    /// Show the last-updated timestamp in the footer.
    #[serde(default = "default_true")]
    pub show_timestamp: bool,

    /// Show the brand label in the footer.
    #[serde(default = "default_true")]
    pub show_brand: bool,

    /// Brand label text.
    /// Default: Roent.List
    #[serde(default = "OverlayConfig::default_brand_text")]
    pub brand_text: String,

    /// Synchronization period in milliseconds.
    /// Default: 1000
    #[serde(default = "OverlayConfig::default_tick_ms")]
    pub tick_ms: u64,
}

impl OverlayConfig {
    fn default_size() -> String {
        "800x600".to_string()
    }

    fn default_font_scale() -> f64 {
        1.5
    }

    fn default_theme() -> String {
        "pastel_blue".to_string()
    }

    fn default_brand_text() -> String {
        "Roent.List".to_string()
    }

    fn default_tick_ms() -> u64 {
        1000
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            font_scale: Self::default_font_scale(),
            theme: Self::default_theme(),
            show_timestamp: true,
            show_brand: true,
            brand_text: Self::default_brand_text(),
            tick_ms: Self::default_tick_ms(),
        }
    }
}

/// Wording of the timestamp transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampsConfig {
    /// Label of the synthetic first line (`00:00 <label>`).
    #[serde(default = "StampsConfig::default_start_label")]
    pub start_label: String,

    /// Title used when a song no longer resolves in the catalog.
    #[serde(default = "StampsConfig::default_missing_title")]
    pub missing_title: String,
}

impl StampsConfig {
    fn default_start_label() -> String {
        "開始".to_string()
    }

    fn default_missing_title() -> String {
        "(不明)".to_string()
    }
}

impl Default for StampsConfig {
    fn default() -> Self {
        Self {
            start_label: Self::default_start_label(),
            missing_title: Self::default_missing_title(),
        }
    }
}

/// Background music played between songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BgmConfig {
    #[serde(default)]
    pub audio_path: String,

    #[serde(default)]
    pub video_path: String,

    /// When both files exist, offer the video instead of the audio.
    #[serde(default)]
    pub prefer_video: bool,
}

fn default_true() -> bool {
    true
}
