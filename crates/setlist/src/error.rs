use songbook::SongId;

pub type Result<T, E = SetlistError> = std::result::Result<T, E>;

/// Errors surfaced by the session core.
///
/// Only `IndexOutOfRange` ever reaches an operator directly. Catalog misses
/// and artifact failures are absorbed by the stamp formatter and the overlay
/// synchronizer, which log them and carry on.
#[derive(Debug, thiserror::Error)]
pub enum SetlistError {
    #[error("Queue index {index} out of range (queue length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Song {0} not found in catalog")]
    CatalogMiss(SongId),

    #[error("Failed to write {target}")]
    ArtifactWrite {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render overlay: {0}")]
    Render(String),
}
