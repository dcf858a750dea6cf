//! `song` subcommands: catalog maintenance from the shell.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;
use setlistconf::SetlistConfig;
use songbook::{NewSong, SearchFilters, SongDb, SongId, SongRecord};

#[derive(Subcommand, Debug)]
pub enum SongCommand {
    /// Add a song to the catalog
    Add(SongFields),

    /// Replace every field of an existing song
    Update {
        id: SongId,
        #[command(flatten)]
        fields: SongFields,
    },

    /// Show one song
    Show {
        id: SongId,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the catalog, newest first
    Search {
        /// Title or title reading contains
        #[arg(long)]
        title: Option<String>,
        /// Artist or artist reading contains
        #[arg(long)]
        artist: Option<String>,
        /// Provider or provider reading contains
        #[arg(long)]
        provider: Option<String>,
        /// Keywords contain
        #[arg(long)]
        keyword: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a song
    Delete { id: SongId },
}

#[derive(Args, Debug, Clone)]
pub struct SongFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub artist: String,
    #[arg(long, default_value = "")]
    pub title_kana: String,
    #[arg(long, default_value = "")]
    pub artist_kana: String,
    /// Who supplied the backing track
    #[arg(long, default_value = "")]
    pub provider: String,
    #[arg(long, default_value = "")]
    pub provider_kana: String,
    #[arg(long, default_value = "")]
    pub keywords: String,
    #[arg(long, default_value = "")]
    pub lyrics: String,
    #[arg(long, default_value = "")]
    pub credit_text: String,
    #[arg(long, default_value = "")]
    pub video_path: String,
    #[arg(long, default_value = "")]
    pub audio_path: String,
    #[arg(long, default_value = "")]
    pub audio_url: String,
    #[arg(long, default_value = "")]
    pub original_url: String,
}

impl From<SongFields> for NewSong {
    fn from(f: SongFields) -> Self {
        NewSong {
            title: f.title,
            title_kana: f.title_kana,
            artist: f.artist,
            artist_kana: f.artist_kana,
            provider: f.provider,
            provider_kana: f.provider_kana,
            keywords: f.keywords,
            lyrics: f.lyrics,
            credit_text: f.credit_text,
            video_path: f.video_path,
            audio_path: f.audio_path,
            audio_url: f.audio_url,
            original_url: f.original_url,
        }
    }
}

pub fn run(command: SongCommand, config: &SetlistConfig) -> Result<()> {
    let db_path = config.paths.catalog_db();
    let db = SongDb::open(&db_path)
        .with_context(|| format!("Failed to open catalog at {}", db_path.display()))?;

    match command {
        SongCommand::Add(fields) => {
            let song = NewSong::from(fields);
            let id = db.insert_song(&song)?;
            println!("Added song {id}: {} - {}", song.title.trim(), song.artist.trim());
        }
        SongCommand::Update { id, fields } => {
            if !db.update_song(id, &NewSong::from(fields))? {
                bail!("Song {id} not found");
            }
            println!("Updated song {id}");
        }
        SongCommand::Show { id, json } => {
            let Some(song) = db.get_song(id)? else {
                bail!("Song {id} not found");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&song)?);
            } else {
                print_song(&song);
            }
        }
        SongCommand::Search {
            title,
            artist,
            provider,
            keyword,
            json,
        } => {
            let filters = SearchFilters {
                title: title.unwrap_or_default(),
                artist: artist.unwrap_or_default(),
                provider: provider.unwrap_or_default(),
                keyword: keyword.unwrap_or_default(),
            };
            let songs = db.search_songs(&filters)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&songs)?);
            } else if songs.is_empty() {
                println!("No songs found");
            } else {
                for song in &songs {
                    println!("{:>5}  {}", song.id.0, song.display_line());
                }
            }
        }
        SongCommand::Delete { id } => {
            if !db.delete_song(id)? {
                bail!("Song {id} not found");
            }
            println!("Deleted song {id}");
        }
    }

    Ok(())
}

fn print_song(song: &SongRecord) {
    println!("{} {}", "Song".bold(), song.id);
    let rows = [
        ("title", &song.title),
        ("title_kana", &song.title_kana),
        ("artist", &song.artist),
        ("artist_kana", &song.artist_kana),
        ("provider", &song.provider),
        ("provider_kana", &song.provider_kana),
        ("keywords", &song.keywords),
        ("credit", &song.credit_text),
        ("video", &song.video_path),
        ("audio", &song.audio_path),
        ("audio_url", &song.audio_url),
        ("original_url", &song.original_url),
    ];
    for (label, value) in rows {
        if !value.is_empty() {
            println!("  {label:<14} {value}");
        }
    }
    println!("  {:<14} {}", "added", song.created_at.format("%Y-%m-%d %H:%M"));
    if !song.lyrics.trim().is_empty() {
        println!();
        println!("{}", song.lyrics.trim_end());
    }
}
