//! Diff-gated artifact publishing.
//!
//! [`MemoizedWriter`] keeps the last successfully published rendering and
//! skips the sink when a new rendering is byte-identical. Sinks publish
//! atomically: readers see the old artifact or the new one, never a torn
//! write.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, SetlistError};

/// Destination for a rendered artifact.
pub trait ArtifactSink: Send {
    /// Replace the artifact with `bytes`, all or nothing.
    fn publish(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Where the artifact goes, for logs and errors.
    fn describe(&self) -> String;
}

/// Writes to a temp file beside the target, then renames it into place.
#[derive(Debug, Clone)]
pub struct AtomicFileSink {
    path: PathBuf,
}

impl AtomicFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactSink for AtomicFileSink {
    fn publish(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

#[derive(Debug)]
pub struct MemoizedWriter<S> {
    sink: S,
    last: Option<String>,
}

impl<S: ArtifactSink> MemoizedWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last: None }
    }

    /// Publish `rendered` unless it matches the last published form.
    ///
    /// A failed publish leaves the memory untouched, so the same rendering
    /// is attempted again on the next call.
    pub fn write_if_changed(&mut self, rendered: String) -> Result<WriteOutcome> {
        if self.last.as_deref() == Some(rendered.as_str()) {
            return Ok(WriteOutcome::Unchanged);
        }

        self.sink
            .publish(rendered.as_bytes())
            .map_err(|source| SetlistError::ArtifactWrite {
                target: self.sink.describe(),
                source,
            })?;

        debug!(target_path = %self.sink.describe(), bytes = rendered.len(), "Artifact published");
        self.last = Some(rendered);
        Ok(WriteOutcome::Written)
    }

}
