use songbook::{SongCatalog, SongId, SongRecord};
use tracing::warn;

use crate::error::{Result, SetlistError};

/// Resolve a song for display. Backend failures count as misses so a flaky
/// catalog degrades to placeholder titles instead of aborting a render.
pub(crate) fn resolve_song(catalog: &dyn SongCatalog, id: SongId) -> Result<SongRecord> {
    match catalog.lookup(id) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(SetlistError::CatalogMiss(id)),
        Err(e) => {
            warn!(song = %id, error = %e, "Catalog lookup failed");
            Err(SetlistError::CatalogMiss(id))
        }
    }
}
