use std::error::Error as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};
use songbook::SongCatalog;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::options::OverlayOptions;
use super::render::OverlayRenderer;
use super::snapshot::OverlaySnapshot;
use super::writer::{ArtifactSink, MemoizedWriter, WriteOutcome};
use crate::engine::SessionView;
use crate::error::Result;
use crate::ticker::spawn_ticker;
use crate::SharedSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Written,
    Unchanged,
    /// Rendering or publishing failed; logged, retried next tick
    Failed,
}

/// Turns session views into the overlay artifact, writing only on change.
pub struct OverlaySynchronizer<S> {
    catalog: Arc<dyn SongCatalog>,
    options: OverlayOptions,
    missing_title: String,
    renderer: OverlayRenderer,
    writer: MemoizedWriter<S>,
}

impl<S: ArtifactSink> OverlaySynchronizer<S> {
    pub fn new(
        catalog: Arc<dyn SongCatalog>,
        options: OverlayOptions,
        missing_title: impl Into<String>,
        sink: S,
    ) -> Result<Self> {
        Ok(Self {
            catalog,
            options,
            missing_title: missing_title.into(),
            renderer: OverlayRenderer::new()?,
            writer: MemoizedWriter::new(sink),
        })
    }

    pub fn tick(&mut self, view: &SessionView) -> TickOutcome {
        self.tick_at(view, Local::now())
    }

    /// One synchronization pass with an explicit wall-clock time for the
    /// footer timestamp.
    pub fn tick_at(&mut self, view: &SessionView, now: DateTime<Local>) -> TickOutcome {
        let snapshot = OverlaySnapshot::build(
            view,
            self.catalog.as_ref(),
            &self.options,
            &self.missing_title,
            now,
        );

        let rendered = match self.renderer.render(&snapshot, &self.options) {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Overlay render failed");
                return TickOutcome::Failed;
            }
        };

        match self.writer.write_if_changed(rendered) {
            Ok(WriteOutcome::Written) => TickOutcome::Written,
            Ok(WriteOutcome::Unchanged) => TickOutcome::Unchanged,
            Err(e) => {
                let cause = e.source().map(ToString::to_string).unwrap_or_default();
                warn!(error = %e, %cause, "Overlay write failed, will retry");
                TickOutcome::Failed
            }
        }
    }
}

impl<S> std::fmt::Debug for OverlaySynchronizer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlaySynchronizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Run the synchronizer every `period` until `shutdown` fires.
///
/// Each tick copies the session view under a read lock, then renders and
/// writes on the blocking pool so a slow disk never holds the session.
pub fn spawn_overlay_task<S>(
    session: SharedSession,
    synchronizer: OverlaySynchronizer<S>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    S: ArtifactSink + 'static,
{
    let synchronizer = Arc::new(Mutex::new(synchronizer));

    spawn_ticker("overlay", period, shutdown, move || {
        let session = session.clone();
        let synchronizer = synchronizer.clone();
        async move {
            let view = session.read().await.view();

            let result = tokio::task::spawn_blocking(move || match synchronizer.lock() {
                Ok(mut sync) => sync.tick(&view),
                Err(poisoned) => poisoned.into_inner().tick(&view),
            })
            .await;

            match result {
                Ok(outcome) => debug!(?outcome, "Overlay tick"),
                Err(e) => error!(error = %e, "Overlay tick panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SessionEngine;
    use crate::overlay::writer::test_support::RecordingSink;
    use crate::timer::ManualClock;
    use chrono::TimeZone;
    use songbook::{InMemoryCatalog, NewSong};
    use std::sync::mpsc;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 21, 30, 0).unwrap()
    }

    fn synchronizer(
        catalog: Arc<InMemoryCatalog>,
    ) -> (RecordingSink, OverlaySynchronizer<RecordingSink>) {
        let sink = RecordingSink::default();
        let sync =
            OverlaySynchronizer::new(catalog, OverlayOptions::default(), "(不明)", sink.clone())
                .unwrap();
        (sink, sync)
    }

    /// Parks inside `publish` until the test lets it go.
    struct StallingSink {
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
    }

    impl ArtifactSink for StallingSink {
        fn publish(&mut self, _bytes: &[u8]) -> std::io::Result<()> {
            let _ = self.entered.send(());
            // Returns once the test sends or drops the release side
            let _ = self.release.recv();
            Ok(())
        }

        fn describe(&self) -> String {
            "stalling".to_string()
        }
    }

    #[test]
    fn test_second_tick_without_changes_is_noop() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let id = catalog.insert(NewSong::new("Song", "Artist")).unwrap();
        let (sink, mut sync) = synchronizer(catalog);

        let mut engine = SessionEngine::default();
        engine.enqueue(id);
        engine.select_from_queue(0).unwrap();
        let view = engine.view();

        assert_eq!(sync.tick_at(&view, fixed_time()), TickOutcome::Written);
        assert_eq!(sync.tick_at(&view, fixed_time()), TickOutcome::Unchanged);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_state_change_triggers_write() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let a = catalog.insert(NewSong::new("A", "x")).unwrap();
        let b = catalog.insert(NewSong::new("B", "y")).unwrap();
        let (sink, mut sync) = synchronizer(catalog);

        let mut engine = SessionEngine::default();
        engine.enqueue(a);
        engine.enqueue(b);
        sync.tick_at(&engine.view(), fixed_time());

        engine.select_from_queue(0).unwrap();
        assert_eq!(sync.tick_at(&engine.view(), fixed_time()), TickOutcome::Written);
        assert!(sink.last().unwrap().contains("A - x"));
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn test_timer_advance_changes_rendering() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let (sink, mut sync) = synchronizer(catalog);
        let clock = Arc::new(ManualClock::new());
        let mut engine = SessionEngine::with_clock(clock.clone());
        engine.start_timer();

        sync.tick_at(&engine.view(), fixed_time());
        clock.advance(Duration::from_secs(1));
        assert_eq!(sync.tick_at(&engine.view(), fixed_time()), TickOutcome::Written);
        assert!(sink.last().unwrap().contains("00:00:01"));
    }

    #[test]
    fn test_write_failure_is_absorbed_and_retried() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let (sink, mut sync) = synchronizer(catalog);
        let view = SessionEngine::default().view();

        sink.set_failing(true);
        assert_eq!(sync.tick_at(&view, fixed_time()), TickOutcome::Failed);
        assert_eq!(sync.tick_at(&view, fixed_time()), TickOutcome::Failed);

        sink.set_failing(false);
        assert_eq!(sync.tick_at(&view, fixed_time()), TickOutcome::Written);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_deleted_song_renders_placeholder() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let gone = catalog.insert(NewSong::new("Gone", "x")).unwrap();
        let kept = catalog.insert(NewSong::new("Kept", "y")).unwrap();
        let (sink, mut sync) = synchronizer(catalog.clone());

        let mut engine = SessionEngine::default();
        engine.enqueue(gone);
        engine.enqueue(kept);
        catalog.remove(gone).unwrap();

        assert_eq!(sync.tick_at(&engine.view(), fixed_time()), TickOutcome::Written);
        let html = sink.last().unwrap();
        assert!(html.contains("<div>(不明)</div>"));
        assert!(html.contains("<div>Kept - y</div>"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stuck_publish_does_not_block_session_writes() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let a = catalog.insert(NewSong::new("A", "x")).unwrap();
        let b = catalog.insert(NewSong::new("B", "y")).unwrap();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let sink = StallingSink {
            entered: entered_tx,
            release: release_rx,
        };
        let sync =
            OverlaySynchronizer::new(catalog, OverlayOptions::default(), "(不明)", sink).unwrap();

        let mut engine = SessionEngine::default();
        engine.enqueue(a);
        engine.enqueue(b);
        let session: SharedSession = Arc::new(tokio::sync::RwLock::new(engine));

        let shutdown = CancellationToken::new();
        let handle = spawn_overlay_task(
            session.clone(),
            sync,
            Duration::from_millis(10),
            shutdown.clone(),
        );

        // Wait until the first tick is parked inside publish
        let wait = Duration::from_secs(5);
        let parked = tokio::task::spawn_blocking(move || entered_rx.recv_timeout(wait))
            .await
            .unwrap();
        assert!(parked.is_ok(), "overlay tick never reached publish");

        let selected = tokio::time::timeout(Duration::from_millis(500), async {
            session.write().await.select_from_queue(0)
        })
        .await
        .expect("session write lock was held by the stalled publish")
        .unwrap();
        assert_eq!(selected.song, a);
        assert_eq!(session.read().await.queue(), vec![b]);

        drop(release_tx);
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
