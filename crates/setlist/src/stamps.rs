//! Video-description timestamps

use setlistconf::StampsConfig;
use songbook::SongCatalog;

use crate::engine::SessionEntry;
use crate::lookup::resolve_song;

/// `MM:SS`, or `H:MM:SS` once the offset reaches an hour.
pub fn format_stamp_time(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// `HH:MM:SS`, always three fields.
pub fn format_clock(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampLabels {
    /// Text of the synthetic `00:00` line
    pub start_label: String,
    /// Stands in for songs the catalog no longer has
    pub missing_title: String,
}

impl Default for StampLabels {
    fn default() -> Self {
        Self::from(&StampsConfig::default())
    }
}

impl From<&StampsConfig> for StampLabels {
    fn from(config: &StampsConfig) -> Self {
        Self {
            start_label: config.start_label.clone(),
            missing_title: config.missing_title.clone(),
        }
    }
}

/// One line per event, preceded by the start marker.
pub fn format_stamps(
    events: &[SessionEntry],
    catalog: &dyn SongCatalog,
    labels: &StampLabels,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(format!("{} {}", format_stamp_time(0), labels.start_label));
    for event in events {
        let title = resolve_song(catalog, event.song)
            .map(|record| record.title)
            .unwrap_or_else(|_| labels.missing_title.clone());
        lines.push(format!("{} {}", format_stamp_time(event.start_offset), title));
    }
    lines
}

/// The stamp lines as a pasteable block with a trailing newline.
pub fn stamps_text(
    events: &[SessionEntry],
    catalog: &dyn SongCatalog,
    labels: &StampLabels,
) -> String {
    let mut text = format_stamps(events, catalog, labels).join("\n");
    text.push('\n');
    text
}
