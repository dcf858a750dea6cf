//! SQLite-backed song catalog.
//!
//! The catalog is the only persistent state in the system. The session core
//! only ever sees it through the [`SongCatalog`] trait: songs are addressed by
//! [`SongId`] and may disappear at any time.

pub mod catalog;
pub mod db;
pub mod types;

pub use catalog::{InMemoryCatalog, SongCatalog};
pub use db::SongDb;
pub use types::{NewSong, SearchFilters, SongId, SongRecord};

/// Catalog validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SongbookError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid song id: {0:?}")]
    InvalidId(String),
}
