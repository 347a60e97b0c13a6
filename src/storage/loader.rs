//! Reading and writing catalog snapshots as JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::diff::{diff, duplicate_part_numbers};
use crate::error::StorageError;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Decodes a catalog from a JSON string.
///
/// # Errors
///
/// Returns the decode error if `json` does not have the snapshot shape.
pub fn parse_catalog(json: &str) -> Result<Catalog, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads and decodes a catalog snapshot.
///
/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read and
/// `StorageError::Decode` if it is not a valid snapshot.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, StorageError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(io_err(path))?;
    let catalog: Catalog =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        path = %path.display(),
        parts = catalog.part_count(),
        brands = catalog.data.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Writes a catalog snapshot.
///
/// The JSON goes to a sibling temporary file which is synced and then
/// renamed over `path`, so readers never observe a partial snapshot.
///
/// # Errors
///
/// Returns `StorageError::Io` on any filesystem failure and
/// `StorageError::Encode` if serialization fails.
pub fn save_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> Result<(), StorageError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let result = write_then_rename(&temp_path, path, catalog);
    if result.is_err() && temp_path.exists() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename(temp_path: &Path, path: &Path, catalog: &Catalog) -> Result<(), StorageError> {
    let file = File::create(temp_path).map_err(io_err(temp_path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, catalog).map_err(StorageError::Encode)?;
    writer.flush().map_err(io_err(temp_path))?;
    writer.get_ref().sync_all().map_err(io_err(temp_path))?;
    fs::rename(temp_path, path).map_err(io_err(path))
}

/// Stores the diff of `new` against `old` inside `new`.
pub fn record_changes(new: &mut Catalog, old: &Catalog) {
    for (brand, line, pn) in duplicate_part_numbers(new)
        .into_iter()
        .chain(duplicate_part_numbers(old))
    {
        warn!(%brand, %line, part_number = %pn, "duplicate part number; diff pairing is order-dependent");
    }
    new.changes = diff(new, old);
}

/// A directory of per-region snapshots with dated backups.
///
/// The current snapshot for a region lives at `<dir>/db_<region>.json`;
/// publishing a new one moves the previous file to
/// `<dir>/backup/db_<region>_<MMDD>.json`, dated by its capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the current snapshot for `short_region`.
    pub fn current_path(&self, short_region: &str) -> PathBuf {
        self.dir.join(format!("db_{short_region}.json"))
    }

    /// Path a snapshot captured as `old` would be backed up to.
    pub fn backup_path(&self, old: &Catalog) -> PathBuf {
        let date = old
            .captured_at()
            .map_or_else(|| "0000".to_string(), |t| t.format("%m%d").to_string());
        self.dir
            .join("backup")
            .join(format!("db_{}_{date}.json", old.metadata.short_region))
    }

    /// Loads the current snapshot for `short_region`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn load_current(&self, short_region: &str) -> Result<Option<Catalog>, StorageError> {
        let path = self.current_path(short_region);
        if !path.exists() {
            return Ok(None);
        }
        load_catalog(&path).map(Some)
    }

    /// Publishes `catalog` as the current snapshot for its region.
    ///
    /// If a previous snapshot exists, its changes relative to `catalog` are
    /// recorded in `catalog.changes` and the previous file is moved to the
    /// backup directory. Returns the backup path, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the previous snapshot, moving it, or
    /// writing the new one fails.
    pub fn publish(&self, catalog: &mut Catalog) -> Result<Option<PathBuf>, StorageError> {
        let short_region = catalog.metadata.short_region.clone();
        let current = self.current_path(&short_region);

        let backup = match self.load_current(&short_region)? {
            Some(old) => {
                record_changes(catalog, &old);
                let backup = self.backup_path(&old);
                if let Some(parent) = backup.parent() {
                    fs::create_dir_all(parent).map_err(io_err(parent))?;
                }
                fs::rename(&current, &backup).map_err(io_err(&current))?;
                info!(from = %current.display(), to = %backup.display(), "backed up snapshot");
                Some(backup)
            }
            None => None,
        };

        save_catalog(&current, catalog)?;
        info!(path = %current.display(), parts = catalog.metadata.total, "published snapshot");
        Ok(backup)
    }
}
