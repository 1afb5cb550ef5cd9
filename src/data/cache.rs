use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{LoadError, load_file};
use super::model::GameTable;

// ---------------------------------------------------------------------------
// TableCache – loaded tables memoized by path
// ---------------------------------------------------------------------------

/// Loaded tables keyed by the path exactly as supplied.
///
/// Entries are never invalidated: input files are treated as static for the
/// lifetime of the session. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, Arc<GameTable>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, reading it on first use.
    pub fn load(&mut self, path: &Path) -> Result<Arc<GameTable>, LoadError> {
        if let Some(table) = self.entries.get(path) {
            log::debug!("Table cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }

        log::info!("Table cache miss for {}, reading file", path.display());
        let table = Arc::new(load_file(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Number of distinct paths loaded so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const CSV: &str = "season,phase,team_abbr,local_team_name,visitante_team_name,partido_id,fecha,is_home,resultado,sacks_permitidos,pct_sacks,puntos_anotados,margin\n\
                       2023,regular,KC,Chiefs,Lions,g1,2023-09-07,True,loss,3,7.5,20,-8\n";

    #[test]
    fn test_repeated_load_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.csv");
        fs::write(&path, CSV).unwrap();

        let mut cache = TableCache::new();
        let first = cache.load(&path).unwrap();

        // Changing the file does not matter once it is cached.
        fs::remove_file(&path).unwrap();
        let second = cache.load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.rows(), second.rows());
        assert_eq!(second.rows()[0].week, 36);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.csv");

        let mut cache = TableCache::new();
        assert!(cache.load(&path).is_err());
        assert_eq!(cache.len(), 0);

        fs::write(&path, CSV).unwrap();
        assert_eq!(cache.load(&path).unwrap().len(), 1);
        assert_eq!(cache.len(), 1);
    }
}
