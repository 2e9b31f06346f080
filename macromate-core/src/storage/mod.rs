//! On-disk persistence for MacroMate.
//!
//! The whole application state lives in one JSON snapshot:
//! - `macromate.json`: versioned object holding the active user, goals, the
//!   food catalog, custom foods, day logs and the three account tables
//!
//! Saves write a sibling `macromate.json.tmp` and rename it over the
//! snapshot, so a crash mid-save leaves the previous snapshot intact.

mod catalog;
mod snapshot;
mod snapshot_storage;

pub use catalog::{default_catalog, seed_catalog};
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use snapshot_storage::{SnapshotStorage, StorageError, SNAPSHOT_FILENAME};
