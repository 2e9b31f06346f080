use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::snapshot::{Snapshot, VersionProbe, SNAPSHOT_VERSION};

/// Name of the snapshot file inside the data directory.
pub const SNAPSHOT_FILENAME: &str = "macromate.json";

/// Errors that can occur while reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for {}: {1}", .0.display())]
    IoError(PathBuf, #[source] io::Error),

    #[error("Failed to parse snapshot {}: {1}", .0.display())]
    ParseError(PathBuf, #[source] serde_json::Error),

    #[error("Failed to serialize snapshot: {0}")]
    SerializeError(#[source] serde_json::Error),

    #[error("Unsupported snapshot version {found} in {} (expected {expected})", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// Reads and writes the single JSON snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    data_dir: PathBuf,
}

impl SnapshotStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILENAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.tmp", SNAPSHOT_FILENAME))
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Loads the snapshot.
    ///
    /// Returns `Ok(None)` if the file doesn't exist. Unparseable content and
    /// a version other than the current one are errors.
    pub fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let path = self.path();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::IoError(path, e)),
        };

        let probe: VersionProbe = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::ParseError(path.clone(), e))?;
        if probe.version != SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path,
                found: probe.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::ParseError(path, e))?;
        Ok(Some(snapshot))
    }

    /// Writes the snapshot to a temporary file and renames it into place.
    ///
    /// Creates the data directory if it doesn't exist.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let bytes = serde_json::to_vec_pretty(snapshot).map_err(StorageError::SerializeError)?;

        let temp = self.temp_path();
        fs::write(&temp, bytes).map_err(|e| StorageError::IoError(temp.clone(), e))?;

        let path = self.path();
        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(StorageError::IoError(path, e));
        }
        Ok(())
    }
}
