use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, Row};
use tracing::{debug, info};

use crate::catalog::SongCatalog;
use crate::types::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    title_kana TEXT DEFAULT '',
    artist TEXT NOT NULL,
    artist_kana TEXT DEFAULT '',
    provider TEXT DEFAULT '',
    provider_kana TEXT DEFAULT '',
    keywords TEXT DEFAULT '',
    lyrics TEXT DEFAULT '',
    credit_text TEXT DEFAULT '',
    video_path TEXT DEFAULT '',
    audio_path TEXT DEFAULT '',
    audio_url TEXT DEFAULT '',
    original_url TEXT DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Columns added after the first schema; older databases get them on open.
const MIGRATED_COLUMNS: &[(&str, &str)] = &[
    ("title_kana", "TEXT DEFAULT ''"),
    ("artist_kana", "TEXT DEFAULT ''"),
    ("provider_kana", "TEXT DEFAULT ''"),
];

const SELECT_COLUMNS: &str = "id, title, title_kana, artist, artist_kana, provider, provider_kana,
     keywords, lyrics, credit_text, video_path, audio_path, audio_url, original_url, created_at";

/// SQLite-backed song catalog. Every call opens its own WAL connection, so a
/// `SongDb` is cheap to share between the console and the overlay task.
pub struct SongDb {
    path: PathBuf,
}

impl SongDb {
    /// Open (or create) the catalog at `path`, migrating older schemas.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        let db = Self { path };
        db.initialize()?;
        Ok(db)
    }

    /// A throwaway catalog in the temp dir; every call gets a fresh file.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let temp_dir = std::env::temp_dir();
        let unique_id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("songbook_{}_{}.db", std::process::id(), unique_id);
        let path = temp_dir.join(db_name);
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to clear stale temp database")?;
        }
        Self::open(path)
    }

    /// Fresh connection; WAL and a 5s busy timeout are set on each one.
    pub fn conn(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {:?}", self.path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        Ok(conn)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;

        for (column, definition) in MIGRATED_COLUMNS {
            ensure_column(&conn, "songs", column, definition)?;
        }
        Ok(())
    }

    /// Insert a song, returning its new id
    pub fn insert_song(&self, song: &NewSong) -> Result<SongId> {
        song.validate()?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO songs (
                title, title_kana, artist, artist_kana, provider, provider_kana,
                keywords, lyrics, credit_text, video_path, audio_path, audio_url, original_url
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                song.title.trim(),
                song.title_kana.trim(),
                song.artist.trim(),
                song.artist_kana.trim(),
                song.provider.trim(),
                song.provider_kana.trim(),
                song.keywords.trim(),
                song.lyrics,
                song.credit_text,
                song.video_path.trim(),
                song.audio_path.trim(),
                song.audio_url.trim(),
                song.original_url.trim(),
            ],
        )?;

        let id = SongId(conn.last_insert_rowid());
        info!(song.id = %id, song.title = %song.title.trim(), "Song registered");
        Ok(id)
    }

    /// Overwrite every editable field of a song. Returns false if the id is unknown.
    pub fn update_song(&self, id: SongId, song: &NewSong) -> Result<bool> {
        song.validate()?;
        let conn = self.conn()?;

        let rows = conn.execute(
            "UPDATE songs SET
                title = ?1, title_kana = ?2, artist = ?3, artist_kana = ?4,
                provider = ?5, provider_kana = ?6, keywords = ?7, lyrics = ?8,
                credit_text = ?9, video_path = ?10, audio_path = ?11,
                audio_url = ?12, original_url = ?13
             WHERE id = ?14",
            rusqlite::params![
                song.title.trim(),
                song.title_kana.trim(),
                song.artist.trim(),
                song.artist_kana.trim(),
                song.provider.trim(),
                song.provider_kana.trim(),
                song.keywords.trim(),
                song.lyrics,
                song.credit_text,
                song.video_path.trim(),
                song.audio_path.trim(),
                song.audio_url.trim(),
                song.original_url.trim(),
                id.0,
            ],
        )?;

        debug!(song.id = %id, rows, "Song updated");
        Ok(rows > 0)
    }

    /// Get a song by ID
    pub fn get_song(&self, id: SongId) -> Result<Option<SongRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM songs WHERE id = ?1"))?;
        let result = stmt.query_row([id.0], row_to_song);

        match result {
            Ok(song) => Ok(Some(song)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a song. Sessions still holding its id will see catalog misses.
    pub fn delete_song(&self, id: SongId) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM songs WHERE id = ?1", [id.0])?;
        Ok(rows > 0)
    }

    /// Search by substring filters, newest first
    pub fn search_songs(&self, filters: &SearchFilters) -> Result<Vec<SongRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        let title = filters.title.trim();
        if !title.is_empty() {
            clauses.push("(title LIKE ? OR title_kana LIKE ?)");
            params.extend([format!("%{title}%"), format!("%{title}%")]);
        }
        let artist = filters.artist.trim();
        if !artist.is_empty() {
            clauses.push("(artist LIKE ? OR artist_kana LIKE ?)");
            params.extend([format!("%{artist}%"), format!("%{artist}%")]);
        }
        let provider = filters.provider.trim();
        if !provider.is_empty() {
            clauses.push("(provider LIKE ? OR provider_kana LIKE ?)");
            params.extend([format!("%{provider}%"), format!("%{provider}%")]);
        }
        let keyword = filters.keyword.trim();
        if !keyword.is_empty() {
            clauses.push("keywords LIKE ?");
            params.push(format!("%{keyword}%"));
        }

        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM songs");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), row_to_song)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of songs in the catalog
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl SongCatalog for SongDb {
    fn lookup(&self, id: SongId) -> Result<Option<SongRecord>> {
        self.get_song(id)
    }

    fn search(&self, filters: &SearchFilters) -> Result<Vec<SongRecord>> {
        self.search_songs(filters)
    }
}

fn row_to_song(row: &Row<'_>) -> rusqlite::Result<SongRecord> {
    // Migrated columns may hold NULL in databases created before they existed
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };

    Ok(SongRecord {
        id: SongId(row.get(0)?),
        title: text(1)?,
        title_kana: text(2)?,
        artist: text(3)?,
        artist_kana: text(4)?,
        provider: text(5)?,
        provider_kana: text(6)?,
        keywords: text(7)?,
        lyrics: text(8)?,
        credit_text: text(9)?,
        video_path: text(10)?,
        audio_path: text(11)?,
        audio_url: text(12)?,
        original_url: text(13)?,
        created_at: parse_datetime(&text(14)?),
    })
}

fn ensure_column(conn: &Connection, table: &str, column: &str, definition: &str) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let existing = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if !existing.iter().any(|c| c == column) {
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
            .with_context(|| format!("Failed to add column {table}.{column}"))?;
        info!(table, column, "Migrated catalog schema");
    }
    Ok(())
}
