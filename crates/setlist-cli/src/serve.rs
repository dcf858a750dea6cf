//! `serve`: run a live session from stdin.
//!
//! The operator types commands; a ticker keeps the overlay page current in
//! the background. On exit the stamp transcript is written to the state dir.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use setlist::overlay::OVERLAY_FILE;
use setlist::{
    choose_bgm, format_clock, format_stamp_time, spawn_overlay_task, stamps_text, AtomicFileSink,
    BgmChoice, MediaLinks, MemoizedWriter, OverlayOptions, OverlaySynchronizer, SessionEngine,
    SharedSession, StampLabels,
};
use setlistconf::{BgmConfig, SetlistConfig};
use songbook::{SearchFilters, SongCatalog, SongDb, SongId, SongRecord};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::console::{ConsoleCommand, HELP};

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Applies operator commands to the shared session.
pub struct Console {
    session: SharedSession,
    catalog: Arc<dyn SongCatalog>,
    labels: StampLabels,
    bgm: BgmConfig,
}

impl Console {
    pub fn new(
        session: SharedSession,
        catalog: Arc<dyn SongCatalog>,
        labels: StampLabels,
        bgm: BgmConfig,
    ) -> Self {
        Self {
            session,
            catalog,
            labels,
            bgm,
        }
    }

    pub async fn execute(&self, command: ConsoleCommand) -> Result<Reply> {
        let text = match command {
            ConsoleCommand::Add(id) => {
                let Some(song) = self.catalog.lookup(id)? else {
                    bail!("Song {id} not found");
                };
                let mut session = self.session.write().await;
                session.enqueue(id);
                format!("Queued [{}] {}", session.queue().len() - 1, song.display_line())
            }
            ConsoleCommand::Select(index) => {
                let entry = self.session.write().await.select_from_queue(index)?;
                format!(
                    "Now: {} @ {}",
                    self.title_line(entry.song),
                    format_stamp_time(entry.start_offset)
                )
            }
            ConsoleCommand::Remove(index) => {
                self.session.write().await.remove_from_queue(index)?;
                self.queue_text().await
            }
            ConsoleCommand::Up(index) => self.shift(index, -1).await?,
            ConsoleCommand::Down(index) => self.shift(index, 1).await?,
            ConsoleCommand::ClearDone => {
                self.session.write().await.clear_finished_history();
                "Finished list cleared".to_string()
            }
            ConsoleCommand::Start => {
                self.session.write().await.start_timer();
                self.timer_text().await
            }
            ConsoleCommand::Stop => {
                self.session.write().await.stop_timer();
                self.timer_text().await
            }
            ConsoleCommand::Toggle => {
                self.session.write().await.toggle_timer();
                self.timer_text().await
            }
            ConsoleCommand::Now => self.now_text().await,
            ConsoleCommand::Queue => self.queue_text().await,
            ConsoleCommand::Done => self.done_text().await,
            ConsoleCommand::Stamps => self.stamps().await.trim_end().to_string(),
            ConsoleCommand::Media => self.media_text().await,
            ConsoleCommand::Bgm => match choose_bgm(&self.bgm) {
                BgmChoice::Audio(path) => format!("BGM (audio): {}", path.display()),
                BgmChoice::Video(path) => format!("BGM (video): {}", path.display()),
                BgmChoice::Missing => "BGM is configured but the file is missing".to_string(),
                BgmChoice::Unset => "No BGM configured".to_string(),
            },
            ConsoleCommand::Search(text) => self.search_text(&text)?,
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    pub async fn stamps(&self) -> String {
        let events = self.session.read().await.events();
        stamps_text(&events, self.catalog.as_ref(), &self.labels)
    }

    async fn shift(&self, index: usize, delta: isize) -> Result<String> {
        let moved = self.session.write().await.move_in_queue(index, delta)?;
        let queue = self.queue_text().await;
        Ok(if moved {
            queue
        } else {
            format!("Already at the edge\n{queue}")
        })
    }

    fn lookup(&self, id: SongId) -> Option<SongRecord> {
        match self.catalog.lookup(id) {
            Ok(found) => found,
            Err(e) => {
                warn!(song = %id, error = %e, "Catalog lookup failed");
                None
            }
        }
    }

    fn title_line(&self, id: SongId) -> String {
        self.lookup(id)
            .map(|song| song.display_line())
            .unwrap_or_else(|| self.labels.missing_title.clone())
    }

    async fn timer_text(&self) -> String {
        let session = self.session.read().await;
        let state = if session.timer_running() {
            "running"
        } else {
            "stopped"
        };
        format!("Timer {state} {}", format_clock(session.elapsed_seconds()))
    }

    async fn now_text(&self) -> String {
        let Some(entry) = self.session.read().await.now_entry() else {
            return "Nothing playing".to_string();
        };
        let Some(song) = self.lookup(entry.song) else {
            return format!(
                "{} (since {})",
                self.labels.missing_title,
                format_stamp_time(entry.start_offset)
            );
        };

        let mut text = format!(
            "{} (since {})",
            song.display_line(),
            format_stamp_time(entry.start_offset)
        );
        if !song.provider.trim().is_empty() {
            text.push_str(&format!("\n音源: {} 様", song.provider.trim()));
        }
        if !song.lyrics.trim().is_empty() {
            text.push_str("\n\n");
            text.push_str(song.lyrics.trim_end());
        }
        text
    }

    async fn queue_text(&self) -> String {
        let queue = self.session.read().await.queue();
        if queue.is_empty() {
            return "Queue is empty".to_string();
        }
        queue
            .iter()
            .enumerate()
            .map(|(i, &id)| format!("{i:>3}  {}", self.title_line(id)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn done_text(&self) -> String {
        let finished = self.session.read().await.finished();
        if finished.is_empty() {
            return "Nothing finished yet".to_string();
        }
        finished
            .iter()
            .rev()
            .map(|e| format!("{}  {}", format_clock(e.start_offset), self.title_line(e.song)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn media_text(&self) -> String {
        let Some(id) = self.session.read().await.now() else {
            return "Nothing playing".to_string();
        };
        let Some(song) = self.lookup(id) else {
            return format!("Song {id} is no longer in the catalog");
        };

        let links = MediaLinks::for_record(&song);
        if links.is_empty() {
            return "No media for this song".to_string();
        }
        let mut lines = Vec::new();
        if let Some(path) = &links.audio {
            lines.push(format!("audio: {}", path.display()));
        }
        if let Some(path) = &links.video {
            lines.push(format!("video: {}", path.display()));
        }
        if let Some(url) = &links.audio_url {
            lines.push(format!("audio url: {url}"));
        }
        if let Some(url) = &links.original_url {
            lines.push(format!("original: {url}"));
        }
        lines.join("\n")
    }

    fn search_text(&self, text: &str) -> Result<String> {
        let by_title = self.catalog.search(&SearchFilters {
            title: text.to_string(),
            ..Default::default()
        })?;
        let by_artist = self.catalog.search(&SearchFilters {
            artist: text.to_string(),
            ..Default::default()
        })?;

        let hits: BTreeMap<SongId, SongRecord> = by_title
            .into_iter()
            .chain(by_artist)
            .map(|song| (song.id, song))
            .collect();
        if hits.is_empty() {
            return Ok("No songs found".to_string());
        }
        Ok(hits
            .values()
            .rev()
            .map(|song| format!("{:>5}  {}", song.id.0, song.display_line()))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

pub async fn run(config: &SetlistConfig) -> Result<()> {
    let state_dir = &config.paths.state_dir;
    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create state directory {}", state_dir.display()))?;

    let db_path = config.paths.catalog_db();
    let db = SongDb::open(&db_path)
        .with_context(|| format!("Failed to open catalog at {}", db_path.display()))?;
    info!(path = %db_path.display(), songs = db.count()?, "Catalog ready");
    let catalog: Arc<dyn SongCatalog> = Arc::new(db);

    let overlay_dir = config.paths.overlay_dir();
    std::fs::create_dir_all(&overlay_dir)
        .with_context(|| format!("Failed to create overlay directory {}", overlay_dir.display()))?;
    let overlay_path = overlay_dir.join(OVERLAY_FILE);

    let labels = StampLabels::from(&config.stamps);
    let session: SharedSession = Arc::new(RwLock::new(SessionEngine::default()));
    let synchronizer = OverlaySynchronizer::new(
        catalog.clone(),
        OverlayOptions::from_config(&config.overlay),
        labels.missing_title.clone(),
        AtomicFileSink::new(&overlay_path),
    )?;

    let shutdown = CancellationToken::new();
    let overlay_task = spawn_overlay_task(
        session.clone(),
        synchronizer,
        Duration::from_millis(config.overlay.tick_ms),
        shutdown.clone(),
    );
    info!(path = %overlay_path.display(), "Overlay page will refresh here");

    let console = Console::new(session, catalog, labels, config.bgm.clone());
    println!("{}", "setlist ready. Type 'help' for commands.".bold());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    info!("stdin closed");
                    break;
                };
                let command = match ConsoleCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{} {e}", "error:".red().bold());
                        continue;
                    }
                };
                match console.execute(command).await {
                    Ok(Reply::Text(text)) => println!("{text}"),
                    Ok(Reply::Quit) => break,
                    Err(e) => eprintln!("{} {e:#}", "error:".red().bold()),
                }
            }
            _ = &mut signal => break,
        }
    }

    shutdown.cancel();
    if let Err(e) = overlay_task.await {
        warn!(error = %e, "Overlay task ended abnormally");
    }

    let stamps = console.stamps().await;
    println!("{}", "Stamps".bold());
    print!("{stamps}");

    let stamps_path = config.paths.stamps_file();
    MemoizedWriter::new(AtomicFileSink::new(&stamps_path))
        .write_if_changed(stamps)
        .context("Stamps were printed above but not saved")?;
    info!(path = %stamps_path.display(), "Stamps exported");

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
        info!("Received SIGINT (Ctrl+C), shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
