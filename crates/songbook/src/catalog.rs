//! The catalog seam consumed by the session core.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::Result;

use crate::types::{NewSong, SearchFilters, SongId, SongRecord};

/// Read access to the song catalog.
///
/// `lookup` returning `Ok(None)` means the song no longer exists (deleted while
/// it was still queued or logged). Callers decide how to present a miss.
pub trait SongCatalog: Send + Sync {
    fn lookup(&self, id: SongId) -> Result<Option<SongRecord>>;

    /// Newest first.
    fn search(&self, filters: &SearchFilters) -> Result<Vec<SongRecord>>;
}

/// Catalog kept in memory, used by tests and as a reference implementation.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    songs: RwLock<BTreeMap<SongId, SongRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with the next free id
    pub fn insert(&self, song: NewSong) -> Result<SongId> {
        song.validate()?;
        let mut songs = self
            .songs
            .write()
            .map_err(|_| anyhow::anyhow!("catalog lock poisoned"))?;
        let id = SongId(songs.keys().next_back().map_or(1, |last| last.0 + 1));
        songs.insert(id, song.into_record(id));
        Ok(id)
    }

    pub fn remove(&self, id: SongId) -> Result<bool> {
        let mut songs = self
            .songs
            .write()
            .map_err(|_| anyhow::anyhow!("catalog lock poisoned"))?;
        Ok(songs.remove(&id).is_some())
    }
}

impl SongCatalog for InMemoryCatalog {
    fn lookup(&self, id: SongId) -> Result<Option<SongRecord>> {
        let songs = self
            .songs
            .read()
            .map_err(|_| anyhow::anyhow!("catalog lock poisoned"))?;
        Ok(songs.get(&id).cloned())
    }

    fn search(&self, filters: &SearchFilters) -> Result<Vec<SongRecord>> {
        let songs = self
            .songs
            .read()
            .map_err(|_| anyhow::anyhow!("catalog lock poisoned"))?;
        Ok(songs
            .values()
            .rev()
            .filter(|s| filters.matches(s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let catalog = InMemoryCatalog::new();
        let a = catalog.insert(NewSong::new("A", "x")).unwrap();
        let b = catalog.insert(NewSong::new("B", "x")).unwrap();
        assert_eq!(a, SongId(1));
        assert_eq!(b, SongId(2));
        assert_eq!(catalog.search(&SearchFilters::default()).unwrap().len(), 2);
    }

    #[test]
    fn removed_song_is_a_miss() {
        let catalog = InMemoryCatalog::new();
        let id = catalog.insert(NewSong::new("A", "x")).unwrap();
        assert!(catalog.remove(id).unwrap());
        assert!(catalog.lookup(id).unwrap().is_none());
        assert!(catalog.search(&SearchFilters::default()).unwrap().is_empty());
    }

    #[test]
    fn search_is_newest_first() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(NewSong::new("Alpha", "Band")).unwrap();
        catalog.insert(NewSong::new("Beta", "Band")).unwrap();
        catalog.insert(NewSong::new("Gamma", "Solo")).unwrap();

        let hits = catalog
            .search(&SearchFilters {
                artist: "band".to_string(),
                ..Default::default()
            })
            .unwrap();
        let titles: Vec<_> = hits.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Beta", "Alpha"]);
    }
}
