//! Session core for live singing broadcasts.
//!
//! The operator keeps a queue of songs, marks one as being performed, and the
//! session remembers when each song started relative to the broadcast timer.
//! Two read-only views are derived from that state:
//!
//! - **Stamps**: `MM:SS title` lines ready to paste into a video description
//!   ([`stamps::format_stamps`]).
//! - **Overlay**: an HTML document for a browser source in the streaming
//!   software, refreshed on a fixed cadence and only rewritten when its
//!   rendering changes ([`overlay::OverlaySynchronizer`]).
//!
//! ```text
//! operator ─► SessionEngine ─► SessionView ─┬─► format_stamps ─► stamps.txt
//!               │  ElapsedTimer              └─► OverlaySnapshot ─► render
//!               ▼                                     ─► MemoizedWriter ─► view.html
//!           SongCatalog (lookup by id, misses tolerated)
//! ```
//!
//! All mutation goes through one owned [`SessionEngine`]. Hosts that share it
//! with the overlay task wrap it in [`SharedSession`].

pub mod engine;
pub mod error;
pub mod media;
pub mod overlay;
pub mod stamps;
pub mod ticker;
pub mod timer;

mod lookup;

pub use engine::{SessionEngine, SessionEntry, SessionView};
pub use error::{Result, SetlistError};
pub use media::{choose_bgm, BgmChoice, MediaLinks};
pub use overlay::{
    spawn_overlay_task, ArtifactSink, AtomicFileSink, MemoizedWriter, OverlayOptions,
    OverlaySnapshot, OverlaySynchronizer, TickOutcome, WriteOutcome,
};
pub use stamps::{format_clock, format_stamp_time, format_stamps, stamps_text, StampLabels};
pub use timer::{Clock, ElapsedTimer, ManualClock, SystemClock};

/// Session shared between the operator command loop and the overlay task.
pub type SharedSession = std::sync::Arc<tokio::sync::RwLock<SessionEngine>>;
