use serde::{Deserialize, Serialize};

use crate::SongbookError;

/// Catalog identifier for a song (SQLite rowid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SongId(pub i64);

impl std::fmt::Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SongId {
    type Err = SongbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(SongId)
            .map_err(|_| SongbookError::InvalidId(s.to_string()))
    }
}

/// A song as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: SongId,
    pub title: String,
    pub title_kana: String,
    pub artist: String,
    pub artist_kana: String,
    /// Who supplied the backing track
    pub provider: String,
    pub provider_kana: String,
    pub keywords: String,
    pub lyrics: String,
    pub credit_text: String,
    pub video_path: String,
    pub audio_path: String,
    pub audio_url: String,
    pub original_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SongRecord {
    /// `title - artist`, without a dangling separator when one side is empty
    pub fn display_line(&self) -> String {
        let line = format!("{} - {}", self.title.trim(), self.artist.trim());
        line.trim_matches(|c| c == ' ' || c == '-').to_string()
    }
}

/// Input for inserting or updating a song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub title_kana: String,
    pub artist: String,
    pub artist_kana: String,
    pub provider: String,
    pub provider_kana: String,
    pub keywords: String,
    pub lyrics: String,
    pub credit_text: String,
    pub video_path: String,
    pub audio_path: String,
    pub audio_url: String,
    pub original_url: String,
}

impl NewSong {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }

    /// Title and artist are required
    pub fn validate(&self) -> Result<(), SongbookError> {
        if self.title.trim().is_empty() {
            return Err(SongbookError::MissingField("title"));
        }
        if self.artist.trim().is_empty() {
            return Err(SongbookError::MissingField("artist"));
        }
        Ok(())
    }

    /// Materialize as a record, used by the in-memory catalog
    pub fn into_record(self, id: SongId) -> SongRecord {
        SongRecord {
            id,
            title: self.title.trim().to_string(),
            title_kana: self.title_kana.trim().to_string(),
            artist: self.artist.trim().to_string(),
            artist_kana: self.artist_kana.trim().to_string(),
            provider: self.provider.trim().to_string(),
            provider_kana: self.provider_kana.trim().to_string(),
            keywords: self.keywords.trim().to_string(),
            lyrics: self.lyrics,
            credit_text: self.credit_text,
            video_path: self.video_path.trim().to_string(),
            audio_path: self.audio_path.trim().to_string(),
            audio_url: self.audio_url.trim().to_string(),
            original_url: self.original_url.trim().to_string(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// Search criteria; blank fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub title: String,
    pub artist: String,
    pub provider: String,
    pub keyword: String,
}

impl SearchFilters {
    /// Case-insensitive substring match, mirroring the SQL `LIKE` filters
    pub fn matches(&self, song: &SongRecord) -> bool {
        fn hit(needle: &str, fields: &[&str]) -> bool {
            let needle = needle.trim().to_lowercase();
            needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
        }

        hit(&self.title, &[&song.title, &song.title_kana])
            && hit(&self.artist, &[&song.artist, &song.artist_kana])
            && hit(&self.provider, &[&song.provider, &song.provider_kana])
            && hit(&self.keyword, &[&song.keywords])
    }
}

/// Parse SQLite datetime string to chrono DateTime
pub fn parse_datetime(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| chrono::Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, artist: &str) -> SongRecord {
        NewSong::new(title, artist).into_record(SongId(1))
    }

    #[test]
    fn display_line_joins_title_and_artist() {
        assert_eq!(record("Lemon", "Kenshi Yonezu").display_line(), "Lemon - Kenshi Yonezu");
    }

    #[test]
    fn display_line_drops_dangling_separator() {
        assert_eq!(record("Lemon", "").display_line(), "Lemon");
        assert_eq!(record("", "Kenshi Yonezu").display_line(), "Kenshi Yonezu");
    }

    #[test]
    fn song_id_parses() {
        assert_eq!(" 42 ".parse::<SongId>().unwrap(), SongId(42));
        assert!(matches!("x".parse::<SongId>(), Err(SongbookError::InvalidId(_))));
    }

    #[test]
    fn validate_requires_title_and_artist() {
        assert!(NewSong::new("Lemon", "Yonezu").validate().is_ok());
        assert!(matches!(
            NewSong::new("  ", "Yonezu").validate(),
            Err(SongbookError::MissingField("title"))
        ));
        assert!(matches!(
            NewSong::new("Lemon", "").validate(),
            Err(SongbookError::MissingField("artist"))
        ));
    }

    #[test]
    fn filters_match_kana_readings() {
        let mut song = NewSong::new("紅蓮華", "LiSA");
        song.title_kana = "ぐれんげ".to_string();
        let song = song.into_record(SongId(7));

        let by_kana = SearchFilters {
            title: "ぐれん".to_string(),
            ..Default::default()
        };
        assert!(by_kana.matches(&song));

        let by_artist = SearchFilters {
            artist: "lisa".to_string(),
            ..Default::default()
        };
        assert!(by_artist.matches(&song));

        let miss = SearchFilters {
            provider: "nobody".to_string(),
            ..Default::default()
        };
        assert!(!miss.matches(&song));
        assert!(SearchFilters::default().matches(&song));
    }
}
