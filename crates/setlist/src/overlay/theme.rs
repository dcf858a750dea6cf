//! Overlay palettes and the colors and font sizes derived from them.

use serde::Serialize;

/// A named color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub id: &'static str,
    pub name: &'static str,
    pub panel: &'static str,
    pub panel2: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
}

pub const DEFAULT_THEME: &str = "pastel_blue";

pub const PALETTES: [Palette; 6] = [
    Palette {
        id: "pastel_pink",
        name: "ピンク",
        panel: "#ffe3f2",
        panel2: "#fff0f8",
        accent: "#ff7eb6",
        text: "#222",
        muted: "#555",
    },
    Palette {
        id: "pastel_orange",
        name: "オレンジ",
        panel: "#ffedd5",
        panel2: "#fff3e6",
        accent: "#fb923c",
        text: "#1f2937",
        muted: "#4b5563",
    },
    Palette {
        id: "pastel_blue",
        name: "ブルー",
        panel: "#dff3ff",
        panel2: "#eef9ff",
        accent: "#60a5fa",
        text: "#1f2937",
        muted: "#4b5563",
    },
    Palette {
        id: "pastel_green",
        name: "グリーン",
        panel: "#dcffe5",
        panel2: "#eefef2",
        accent: "#34d399",
        text: "#1f2937",
        muted: "#4b5563",
    },
    Palette {
        id: "pastel_lavender",
        name: "ラベンダー",
        panel: "#eee1ff",
        panel2: "#f7f0ff",
        accent: "#a78bfa",
        text: "#1f2937",
        muted: "#4b5563",
    },
    Palette {
        id: "dark",
        name: "ダーク",
        panel: "#2b313a",
        panel2: "#242a33",
        accent: "#7dd3fc",
        text: "#e5e7eb",
        muted: "#9ca3af",
    },
];

impl Palette {
    pub fn by_id(id: &str) -> Option<&'static Palette> {
        PALETTES.iter().find(|p| p.id == id)
    }

    /// Resolve an id, falling back to the default theme.
    pub fn resolve(id: &str) -> &'static Palette {
        Self::by_id(id.trim())
            .or_else(|| Self::by_id(DEFAULT_THEME))
            .unwrap_or(&PALETTES[0])
    }

    pub fn is_dark(&self) -> bool {
        self.id == "dark"
    }
}

/// CSS color values for the overlay card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayColors {
    pub card: String,
    pub card2: String,
    pub text: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub shadow: String,
}

impl OverlayColors {
    pub fn from_palette(palette: &Palette) -> Self {
        if palette.is_dark() {
            return Self {
                card: "rgba(20,20,24,.72)".to_string(),
                card2: "rgba(20,20,24,.52)".to_string(),
                text: "rgba(255,255,255,.95)".to_string(),
                muted: "rgba(255,255,255,.75)".to_string(),
                accent: palette.accent.to_string(),
                border: "rgba(255,255,255,.18)".to_string(),
                shadow: "rgba(0,0,0,.55)".to_string(),
            };
        }

        Self {
            card: hex_to_rgba(palette.panel, 0.82),
            card2: hex_to_rgba(palette.panel2, 0.62),
            text: palette.text.to_string(),
            muted: palette.muted.to_string(),
            accent: palette.accent.to_string(),
            border: "rgba(31,41,55,.18)".to_string(),
            shadow: "rgba(0,0,0,.20)".to_string(),
        }
    }
}

/// `#rrggbb` to `rgba(r,g,b,a)`. Anything else becomes a neutral dark tint.
pub fn hex_to_rgba(hex: &str, alpha: f64) -> String {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => format!("rgba({r},{g},{b},{alpha})"),
        _ => format!("rgba(20,20,24,{alpha})"),
    }
}

/// Pixel font sizes after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontSizes {
    pub title: u32,
    pub timer: u32,
    pub meta: u32,
    pub section: u32,
    pub list: u32,
    pub footer: u32,
}

impl FontSizes {
    const BASE: FontSizes = FontSizes {
        title: 26,
        timer: 18,
        meta: 14,
        section: 14,
        list: 16,
        footer: 12,
    };

    pub fn scaled(scale: f64) -> Self {
        let sc = |px: u32| ((f64::from(px) * scale).round() as u32).max(6);
        let b = Self::BASE;
        Self {
            title: sc(b.title),
            timer: sc(b.timer),
            meta: sc(b.meta),
            section: sc(b.section),
            list: sc(b.list),
            footer: sc(b.footer),
        }
    }
}
