//! Shared, swappable reference to the current catalog snapshot.
//!
//! Long-running callers (a chat bot, a server) keep one [`CatalogHandle`]
//! and swap in a freshly loaded snapshot when the file on disk changes.
//! Readers take an `Arc` snapshot and keep using it for the whole request;
//! a swap never mutates a catalog that is being read.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::catalog::Catalog;
use crate::error::{LelnovoResult, StorageError};

use super::loader::load_catalog;

/// Holder for the current catalog.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Loads and validates a snapshot file into a new handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or breaks a catalog
    /// invariant.
    pub fn open(path: impl AsRef<Path>) -> LelnovoResult<Self> {
        let catalog = load_catalog(path)?;
        catalog.validate()?;
        Ok(Self::new(catalog))
    }

    /// The current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if a writer panicked mid-swap.
    pub fn current(&self) -> Result<Arc<Catalog>, StorageError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StorageError::Poisoned)
    }

    /// Replaces the current snapshot, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if the lock is poisoned.
    pub fn swap(&self, catalog: Catalog) -> Result<Arc<Catalog>, StorageError> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().map_err(|_| StorageError::Poisoned)?;
        Ok(std::mem::replace(&mut *guard, next))
    }

    /// Loads `path` and swaps it in.
    ///
    /// The previous snapshot stays current if loading or validation fails.
    ///
    /// # Errors
    ///
    /// Returns the load, validation or lock error.
    pub fn reload(&self, path: impl AsRef<Path>) -> LelnovoResult<Arc<Catalog>> {
        let path = path.as_ref();
        let catalog = load_catalog(path)?;
        catalog.validate()?;
        let total = catalog.metadata.total;
        self.swap(catalog)?;
        info!(path = %path.display(), parts = total, "swapped in catalog");
        Ok(self.current()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, Part, STATUS};
    use crate::storage::loader::save_catalog;
    use tempfile::tempdir;

    fn catalog(pn: &str) -> Catalog {
        CatalogBuilder::new("us/en", "")
            .part("yoga", "Y9", Part::new(pn, "Yoga 9i").with_spec(STATUS, "Available"))
            .build()
    }

    #[test]
    fn test_swap_keeps_old_snapshot_alive() {
        let handle = CatalogHandle::new(catalog("A"));
        let before = handle.current().unwrap();
        let previous = handle.swap(catalog("B")).unwrap();

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.iter_parts().next().unwrap().2.part_number(), "A");
        let after = handle.current().unwrap();
        assert_eq!(after.iter_parts().next().unwrap().2.part_number(), "B");
    }

    #[test]
    fn test_reload_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        save_catalog(&path, &catalog("B")).unwrap();

        let handle = CatalogHandle::new(catalog("A"));
        let loaded = handle.reload(&path).unwrap();
        assert_eq!(loaded.iter_parts().next().unwrap().2.part_number(), "B");
    }

    #[test]
    fn test_failed_reload_keeps_previous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "not json").unwrap();

        let handle = CatalogHandle::new(catalog("A"));
        assert!(handle.reload(&path).unwrap_err().is_storage());
        assert_eq!(
            handle.current().unwrap().iter_parts().next().unwrap().2.part_number(),
            "A"
        );
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut bad = catalog("B");
        bad.metadata.total = 99;
        save_catalog(&path, &bad).unwrap();

        let handle = CatalogHandle::new(catalog("A"));
        assert!(handle.reload(&path).unwrap_err().is_validation());
        assert!(CatalogHandle::open(&path).is_err());
    }

    #[test]
    fn test_concurrent_readers() {
        let handle = Arc::new(CatalogHandle::new(catalog("A")));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let snap = handle.current().unwrap();
                        assert_eq!(snap.part_count(), 1);
                    }
                })
            })
            .collect();
        handle.swap(catalog("B")).unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }
}
