//! Local media associated with songs and the between-songs BGM.
//!
//! Nothing here launches a player. Callers get paths and decide what to do.

use std::path::PathBuf;

use serde::Serialize;
use setlistconf::BgmConfig;
use songbook::SongRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaLinks {
    pub audio: Option<PathBuf>,
    pub video: Option<PathBuf>,
    pub audio_url: Option<String>,
    pub original_url: Option<String>,
}

impl MediaLinks {
    /// Paths are kept only when they exist on disk. URLs are passed through.
    pub fn for_record(record: &SongRecord) -> Self {
        Self {
            audio: existing_file(&record.audio_path),
            video: existing_file(&record.video_path),
            audio_url: non_empty(&record.audio_url),
            original_url: non_empty(&record.original_url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none()
            && self.video.is_none()
            && self.audio_url.is_none()
            && self.original_url.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BgmChoice {
    Audio(PathBuf),
    Video(PathBuf),
    /// Configured, but neither file exists
    Missing,
    Unset,
}

pub fn choose_bgm(config: &BgmConfig) -> BgmChoice {
    if config.audio_path.trim().is_empty() && config.video_path.trim().is_empty() {
        return BgmChoice::Unset;
    }

    match (
        existing_file(&config.audio_path),
        existing_file(&config.video_path),
    ) {
        (Some(_), Some(video)) if config.prefer_video => BgmChoice::Video(video),
        (Some(audio), _) => BgmChoice::Audio(audio),
        (None, Some(video)) => BgmChoice::Video(video),
        (None, None) => BgmChoice::Missing,
    }
}

fn existing_file(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let path = setlistconf::expand_path(raw);
    path.is_file().then_some(path)
}

fn non_empty(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}
