//! End-to-end session flows across engine, stamps and overlay.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use setlist::overlay::OVERLAY_FILE;
use setlist::{
    format_stamps, spawn_overlay_task, stamps_text, AtomicFileSink, ManualClock, MemoizedWriter,
    OverlayOptions, OverlaySynchronizer, SessionEngine, SessionEntry, SetlistError, StampLabels,
    WriteOutcome,
};
use songbook::{InMemoryCatalog, NewSong, SongCatalog, SongDb};
use tempfile::TempDir;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

#[test]
fn two_song_broadcast() {
    let catalog = InMemoryCatalog::new();
    let s1 = catalog.insert(NewSong::new("Opening", "Band")).unwrap();
    let s2 = catalog.insert(NewSong::new("Encore", "Band")).unwrap();

    let clock = Arc::new(ManualClock::new());
    let mut engine = SessionEngine::with_clock(clock.clone());
    engine.enqueue(s1);
    engine.enqueue(s2);
    engine.start_timer();

    engine.select_from_queue(0).unwrap();
    assert_eq!(engine.now(), Some(s1));
    assert_eq!(engine.queue(), vec![s2]);
    assert!(engine.finished().is_empty());
    assert_eq!(engine.events(), vec![SessionEntry::new(s1, 0)]);

    clock.advance(Duration::from_secs(65));
    engine.select_from_queue(0).unwrap();
    assert_eq!(engine.now(), Some(s2));
    assert!(engine.queue().is_empty());
    assert_eq!(engine.finished(), vec![SessionEntry::new(s1, 0)]);
    assert_eq!(
        engine.events(),
        vec![SessionEntry::new(s1, 0), SessionEntry::new(s2, 65)]
    );

    assert_eq!(
        format_stamps(&engine.events(), &catalog, &StampLabels::default()),
        vec!["00:00 開始", "00:00 Opening", "01:05 Encore"]
    );
}

#[test]
fn clearing_history_keeps_the_transcript() {
    let catalog = InMemoryCatalog::new();
    let ids: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|t| catalog.insert(NewSong::new(*t, "x")).unwrap())
        .collect();

    let mut engine = SessionEngine::default();
    for id in &ids {
        engine.enqueue(*id);
    }
    engine.select_from_queue(0).unwrap();
    engine.select_from_queue(0).unwrap();
    engine.clear_finished_history();
    engine.select_from_queue(0).unwrap();

    // One finished entry (B) plus now (C); all three selections stay logged
    assert_eq!(engine.finished().len(), 1);
    assert_eq!(engine.events().len(), 3);
    let text = stamps_text(&engine.events(), &catalog, &StampLabels::default());
    assert_eq!(text.lines().count(), 4);
    assert!(text.ends_with("00:00 C\n"));
}

#[test]
fn stale_index_is_reported_and_harmless() {
    let mut engine = SessionEngine::default();
    engine.enqueue(songbook::SongId(1));
    engine.remove_from_queue(0).unwrap();

    let before = engine.view();
    let err = engine.select_from_queue(0).unwrap_err();
    assert!(matches!(err, SetlistError::IndexOutOfRange { index: 0, len: 0 }));
    assert_eq!(engine.view(), before);
}

#[test]
fn sqlite_catalog_feeds_stamps() {
    let dir = TempDir::new().unwrap();
    let db = SongDb::open(dir.path().join("songs.db")).unwrap();
    let id = db.insert_song(&NewSong::new("From Disk", "Artist")).unwrap();

    let mut engine = SessionEngine::default();
    engine.enqueue(id);
    engine.select_from_queue(0).unwrap();

    let catalog: &dyn SongCatalog = &db;
    let lines = format_stamps(&engine.events(), catalog, &StampLabels::default());
    assert_eq!(lines[1], "00:00 From Disk");
}

#[test]
fn stamps_export_is_memoized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stamps.txt");
    let mut writer = MemoizedWriter::new(AtomicFileSink::new(&path));

    let catalog = InMemoryCatalog::new();
    let text = stamps_text(&[], &catalog, &StampLabels::default());
    assert_eq!(writer.write_if_changed(text.clone()).unwrap(), WriteOutcome::Written);
    assert_eq!(writer.write_if_changed(text).unwrap(), WriteOutcome::Unchanged);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "00:00 開始\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overlay_task_publishes_and_follows_the_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obs_viewer").join(OVERLAY_FILE);

    let catalog = Arc::new(InMemoryCatalog::new());
    let first = catalog.insert(NewSong::new("First", "Singer")).unwrap();
    let second = catalog.insert(NewSong::new("Second", "Singer")).unwrap();

    let session = Arc::new(RwLock::new(SessionEngine::default()));
    {
        let mut engine = session.write().await;
        engine.enqueue(first);
        engine.enqueue(second);
        engine.select_from_queue(0).unwrap();
    }

    let synchronizer = OverlaySynchronizer::new(
        catalog,
        OverlayOptions::default(),
        "(不明)",
        AtomicFileSink::new(&path),
    )
    .unwrap();
    let shutdown = CancellationToken::new();
    let handle = spawn_overlay_task(
        session.clone(),
        synchronizer,
        Duration::from_millis(20),
        shutdown.clone(),
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains(r#"<div class="nowTitle">First - Singer</div>"#));
    assert!(html.contains("<div>Second - Singer</div>"));

    session.write().await.select_from_queue(0).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains(r#"<div class="nowTitle">Second - Singer</div>"#));
    assert!(html.contains("00:00:00  First - Singer"));

    shutdown.cancel();
    handle.await.unwrap();
}
