use setlistconf::OverlayConfig;

use super::theme::{FontSizes, OverlayColors, Palette};

const DEFAULT_SIZE: (u32, u32) = (800, 600);
const MIN_SIDE: u32 = 100;
const DEFAULT_FONT_SCALE: f64 = 1.5;
const DEFAULT_BRAND: &str = "Roent.List";

/// Display options after validation. Bad values fall back to defaults
/// instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOptions {
    pub width: u32,
    pub height: u32,
    pub font_scale: f64,
    pub palette: &'static Palette,
    pub show_timestamp: bool,
    pub show_brand: bool,
    pub brand_text: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            font_scale: DEFAULT_FONT_SCALE,
            palette: Palette::resolve(""),
            show_timestamp: true,
            show_brand: true,
            brand_text: DEFAULT_BRAND.to_string(),
        }
    }
}

impl OverlayOptions {
    pub fn from_config(config: &OverlayConfig) -> Self {
        let (width, height) = parse_size(&config.size).unwrap_or(DEFAULT_SIZE);
        let font_scale = if config.font_scale.is_finite() && config.font_scale > 0.0 {
            config.font_scale
        } else {
            DEFAULT_FONT_SCALE
        };

        Self {
            width,
            height,
            font_scale,
            palette: Palette::resolve(&config.theme),
            show_timestamp: config.show_timestamp,
            show_brand: config.show_brand,
            brand_text: config.brand_text.clone(),
        }
    }

    pub fn colors(&self) -> OverlayColors {
        OverlayColors::from_palette(self.palette)
    }

    pub fn font_sizes(&self) -> FontSizes {
        FontSizes::scaled(self.font_scale)
    }
}

/// Parse `"WxH"`, case-insensitive and tolerant of surrounding whitespace.
/// Sides below 100px are rejected.
pub fn parse_size(raw: &str) -> Option<(u32, u32)> {
    let lowered = raw.trim().to_ascii_lowercase();
    let (w, h) = lowered.split_once('x')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    (w >= MIN_SIDE && h >= MIN_SIDE).then_some((w, h))
}
