//! Overlay synchronizer
//!
//! Renders the session into a self-contained HTML page for a streaming
//! browser source and keeps it current on a fixed cadence.
//!
//! ```text
//! SessionView ─► OverlaySnapshot::build ─► OverlayRenderer ─► MemoizedWriter ─► ArtifactSink
//!                 (catalog lookups,          (handlebars,        (skip if same)     (temp file +
//!                  placeholders on miss)      inline CSS)                            rename)
//! ```

pub mod options;
pub mod render;
pub mod snapshot;
pub mod sync;
pub mod theme;
pub mod writer;

pub use options::{parse_size, OverlayOptions};
pub use render::{render_overlay, OverlayRenderer};
pub use snapshot::{OverlaySnapshot, MAX_LINES};
pub use sync::{spawn_overlay_task, OverlaySynchronizer, TickOutcome};
pub use theme::{FontSizes, OverlayColors, Palette, PALETTES};
pub use writer::{ArtifactSink, AtomicFileSink, MemoizedWriter, WriteOutcome};

/// File name of the overlay page inside the overlay directory
pub const OVERLAY_FILE: &str = "view.html";
