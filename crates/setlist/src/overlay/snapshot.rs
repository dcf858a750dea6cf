use chrono::{DateTime, Local};
use serde::Serialize;
use songbook::SongCatalog;

use super::options::OverlayOptions;
use crate::engine::SessionView;
use crate::lookup::resolve_song;
use crate::stamps::format_clock;

/// Lines shown per list
pub const MAX_LINES: usize = 12;

/// Everything the overlay shows, as plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySnapshot {
    pub now_title: String,
    pub now_provider: String,
    pub timer_text: String,
    pub queue_lines: Vec<String>,
    /// Newest first
    pub done_lines: Vec<String>,
    pub updated_at: String,
    pub show_timestamp: bool,
    pub show_brand: bool,
    pub brand_text: String,
}

impl OverlaySnapshot {
    /// Build from a session view. Songs the catalog cannot resolve show
    /// `missing_title` in their slot.
    pub fn build(
        view: &SessionView,
        catalog: &dyn SongCatalog,
        options: &OverlayOptions,
        missing_title: &str,
        now: DateTime<Local>,
    ) -> Self {
        let (now_title, now_provider) = match view.now {
            Some(entry) => match resolve_song(catalog, entry.song) {
                Ok(record) => (record.display_line(), record.provider.trim().to_string()),
                Err(_) => (missing_title.to_string(), String::new()),
            },
            None => (String::new(), String::new()),
        };

        let line_for = |song| {
            resolve_song(catalog, song)
                .map(|record| record.display_line())
                .unwrap_or_else(|_| missing_title.to_string())
        };

        let queue_lines = view
            .queue
            .iter()
            .take(MAX_LINES)
            .map(|&song| line_for(song))
            .collect();

        let done_lines = view
            .finished
            .iter()
            .rev()
            .take(MAX_LINES)
            .map(|entry| format!("{}  {}", format_clock(entry.start_offset), line_for(entry.song)))
            .collect();

        Self {
            now_title,
            now_provider,
            timer_text: format_clock(view.elapsed_secs),
            queue_lines,
            done_lines,
            updated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            show_timestamp: options.show_timestamp,
            show_brand: options.show_brand,
            brand_text: options.brand_text.clone(),
        }
    }
}
