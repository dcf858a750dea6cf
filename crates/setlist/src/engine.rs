//! Session state machine
//!
//! Owns the queue, the song being performed, the finished history and the
//! stamp event log, plus the broadcast timer whose reading becomes each
//! song's start offset.

use std::sync::Arc;

use serde::Serialize;
use songbook::SongId;
use tracing::debug;

use crate::error::{Result, SetlistError};
use crate::timer::{Clock, ElapsedTimer};

/// A song paired with the timer reading when it became "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionEntry {
    pub song: SongId,
    pub start_offset: u64,
}

impl SessionEntry {
    pub fn new(song: SongId, start_offset: u64) -> Self {
        Self { song, start_offset }
    }
}

/// Point-in-time copy of everything the views need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub now: Option<SessionEntry>,
    pub queue: Vec<SongId>,
    pub finished: Vec<SessionEntry>,
    pub events: Vec<SessionEntry>,
    pub elapsed_secs: u64,
    pub timer_running: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SessionEngine {
    timer: ElapsedTimer,
    now: Option<SessionEntry>,
    queue: Vec<SongId>,
    finished: Vec<SessionEntry>,
    events: Vec<SessionEntry>,
}

impl SessionEngine {
    pub fn new(timer: ElapsedTimer) -> Self {
        Self {
            timer,
            now: None,
            queue: Vec::new(),
            finished: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(ElapsedTimer::with_clock(clock))
    }

    /// Append to the end of the queue. Duplicates are allowed.
    pub fn enqueue(&mut self, song: SongId) {
        self.queue.push(song);
        debug!(song = %song, queue_len = self.queue.len(), "Enqueued");
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Result<SongId> {
        self.check_index(index)?;
        let song = self.queue.remove(index);
        debug!(song = %song, index, "Removed from queue");
        Ok(song)
    }

    /// Swap the entry at `index` with its neighbour `delta` positions away.
    ///
    /// Returns `Ok(false)` without touching the queue when the target falls
    /// outside it.
    pub fn move_in_queue(&mut self, index: usize, delta: isize) -> Result<bool> {
        self.check_index(index)?;
        let target = match index.checked_add_signed(delta) {
            Some(t) if t < self.queue.len() => t,
            _ => return Ok(false),
        };
        self.queue.swap(index, target);
        debug!(from = index, to = target, "Moved in queue");
        Ok(true)
    }

    /// Make the queued song at `index` the one being performed.
    ///
    /// The previous "now" song moves to the finished history, the selected
    /// song leaves the queue, and a stamp event is logged at the current
    /// timer reading. An out-of-range index changes nothing.
    pub fn select_from_queue(&mut self, index: usize) -> Result<SessionEntry> {
        self.check_index(index)?;

        if let Some(previous) = self.now.take() {
            self.finished.push(previous);
        }
        let song = self.queue.remove(index);
        let entry = SessionEntry::new(song, self.timer.elapsed_seconds());
        self.now = Some(entry);
        self.events.push(entry);

        debug!(song = %song, offset = entry.start_offset, "Now performing");
        Ok(entry)
    }

    /// Forget the finished history. The stamp log and "now" are kept.
    pub fn clear_finished_history(&mut self) {
        let cleared = self.finished.len();
        self.finished.clear();
        debug!(cleared, "Cleared finished history");
    }

    pub fn start_timer(&mut self) {
        self.timer.start();
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    /// Returns whether the timer is running afterwards
    pub fn toggle_timer(&mut self) -> bool {
        self.timer.toggle()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    pub fn now(&self) -> Option<SongId> {
        self.now.map(|e| e.song)
    }

    pub fn now_entry(&self) -> Option<SessionEntry> {
        self.now
    }

    /// Offset of the current song, zero when nothing is playing
    pub fn now_start_offset(&self) -> u64 {
        self.now.map_or(0, |e| e.start_offset)
    }

    pub fn queue(&self) -> Vec<SongId> {
        self.queue.clone()
    }

    pub fn finished(&self) -> Vec<SessionEntry> {
        self.finished.clone()
    }

    pub fn events(&self) -> Vec<SessionEntry> {
        self.events.clone()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            now: self.now,
            queue: self.queue.clone(),
            finished: self.finished.clone(),
            events: self.events.clone(),
            elapsed_secs: self.timer.elapsed_seconds(),
            timer_running: self.timer.is_running(),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.queue.len() {
            Ok(())
        } else {
            Err(SetlistError::IndexOutOfRange {
                index,
                len: self.queue.len(),
            })
        }
    }
}
