//! Snapshot persistence and the shared catalog handle.
//!
//! The query and diff modules never touch files or global state; they take
//! a `&Catalog`. This module is where snapshots come from.

mod handle;
mod loader;

pub use handle::CatalogHandle;
pub use loader::{load_catalog, parse_catalog, record_changes, save_catalog, SnapshotStore};
