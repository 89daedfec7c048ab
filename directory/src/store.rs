//! Local fallback cache for the volunteer list.
//!
//! The cache holds exactly one snapshot: the full list, serialized as a JSON
//! array under a fixed key and replaced wholesale on every write. It is a
//! best-effort copy, never the source of truth, so the [`RecordStore`]
//! contract swallows failures: a failed read looks like an empty cache and a
//! failed write is logged and dropped.
//!
//! ## Layout
//!
//! ```text
//! ~/.local/share/volunteer-directory/
//!   volunteers.json       [VolunteerRecord, ...]
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::record::{RawVolunteer, VolunteerRecord, normalize_all};

/// Logical key of the snapshot. Also the file stem on disk.
pub const CACHE_KEY: &str = "volunteers";

/// Errors from the file-backed cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("could not determine a data directory")]
    NoDataDir,
}

/// Snapshot cache contract.
pub trait RecordStore: Send + Sync {
    /// Last written snapshot, or an empty list.
    fn read(&self) -> Vec<VolunteerRecord>;

    /// Replace the snapshot.
    fn write(&self, records: &[VolunteerRecord]);
}

/// JSON file cache under the XDG data directory.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    base_dir: PathBuf,
}

impl FileRecordStore {
    /// Create a store at `~/.local/share/volunteer-directory/`.
    pub fn new() -> Result<Self, StoreError> {
        let data_dir = dirs::data_dir()
            .ok_or(StoreError::NoDataDir)?
            .join("volunteer-directory");
        Self::with_base_dir(data_dir)
    }

    /// Create a store with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.base_dir.join(format!("{CACHE_KEY}.json"))
    }

    /// Atomically write `data` to `path` via a `.tmp` sibling.
    fn atomic_write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read the snapshot, surfacing I/O and parse failures.
    pub fn try_read(&self) -> Result<Vec<VolunteerRecord>, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<RawVolunteer> = serde_json::from_str(&data)?;
        Ok(normalize_all(raw))
    }

    /// Replace the snapshot, surfacing I/O and serialization failures.
    pub fn try_write(&self, records: &[VolunteerRecord]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base_dir)?;
        let json = serde_json::to_string_pretty(records)?;
        self.atomic_write(&self.path(), json.as_bytes())
    }
}

impl RecordStore for FileRecordStore {
    fn read(&self) -> Vec<VolunteerRecord> {
        match self.try_read() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Cache read failed ({}): {e}", self.path().display());
                Vec::new()
            }
        }
    }

    fn write(&self, records: &[VolunteerRecord]) {
        if let Err(e) = self.try_write(records) {
            tracing::warn!("Cache write failed ({}): {e}", self.path().display());
        }
    }
}

/// In-process snapshot, for tests and sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    snapshot: Mutex<Vec<VolunteerRecord>>,
    writes: Mutex<usize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<VolunteerRecord>) -> Self {
        Self {
            snapshot: Mutex::new(records),
            writes: Mutex::new(0),
        }
    }

    /// Number of `write` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    fn read(&self) -> Vec<VolunteerRecord> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, records: &[VolunteerRecord]) {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}
