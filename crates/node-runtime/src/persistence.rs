//! # Snapshot Persistence
//!
//! Keeps the ledger snapshot in a locked data directory.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!   LOCK              pid of the owning process, held with an exclusive flock
//!   ledger.snapshot   bincode-encoded LedgerSnapshot
//! ```
//!
//! Writes go to `ledger.snapshot.tmp`, are fsynced, then renamed over the
//! previous snapshot, so a crash mid-write leaves the old snapshot intact.

use fs2::FileExt;
use qc_06_ledger::LedgerSnapshot;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "ledger.snapshot";
const SNAPSHOT_TMP: &str = "ledger.snapshot.tmp";

/// Errors from snapshot storage.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("data directory already in use by {owner} ({path})")]
    AlreadyLocked { owner: String, path: PathBuf },

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("insufficient disk space: need {required} bytes, {available} available")]
    InsufficientSpace { required: u64, available: u64 },
}

/// Exclusive lock on a data directory, released on drop.
#[derive(Debug)]
struct DirectoryLock {
    file: File,
    path: PathBuf,
}

impl DirectoryLock {
    fn acquire(data_dir: &Path) -> Result<Self, PersistenceError> {
        let path = data_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            let owner = fs::read_to_string(&path)
                .ok()
                .map(|pid| pid.trim().to_string())
                .filter(|pid| !pid.is_empty())
                .map_or_else(|| "another process".to_string(), |pid| format!("process {pid}"));
            return Err(PersistenceError::AlreadyLocked { owner, path });
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.sync_all()?;
        Ok(Self { file, path })
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "Failed to release data directory lock");
        }
    }
}

/// Snapshot store rooted at a locked data directory.
#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    min_free_bytes: u64,
    _lock: DirectoryLock,
}

impl SnapshotStore {
    /// Create the directory if needed and take its lock.
    ///
    /// # Errors
    ///
    /// `AlreadyLocked` when another process owns the directory.
    pub fn open(dir: impl Into<PathBuf>, min_free_bytes: u64) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let lock = DirectoryLock::acquire(&dir)?;
        info!(dir = %dir.display(), "Snapshot store opened");
        Ok(Self {
            dir,
            min_free_bytes,
            _lock: lock,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// The stored snapshot, or `None` on first boot.
    pub fn load(&self) -> Result<Option<LedgerSnapshot>, PersistenceError> {
        let path = self.snapshot_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: LedgerSnapshot = bincode::deserialize(&bytes)?;
        info!(
            height = snapshot.height(),
            bytes = bytes.len(),
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Atomically replace the stored snapshot.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), PersistenceError> {
        let bytes = bincode::serialize(snapshot)?;
        self.ensure_space(bytes.len() as u64)?;

        let tmp = self.dir.join(SNAPSHOT_TMP);
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.snapshot_path())?;

        info!(
            height = snapshot.height(),
            bytes = bytes.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    fn ensure_space(&self, len: u64) -> Result<(), PersistenceError> {
        let available = fs2::available_space(&self.dir)?;
        let required = len.saturating_add(self.min_free_bytes);
        if available < required {
            return Err(PersistenceError::InsufficientSpace {
                required,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_06_ledger::{Ledger, LedgerConfig};
    use std::sync::Arc;

    fn sample_snapshot() -> LedgerSnapshot {
        let ledger = Arc::new(Ledger::new(LedgerConfig::for_testing()).unwrap());
        ledger.create_wallet().unwrap();
        ledger.start().unwrap();
        ledger.stop();
        ledger.snapshot()
    }

    #[test]
    fn test_first_boot_has_no_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path(), 0).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path(), 0).unwrap();
        let snapshot = sample_snapshot();

        store.save(&snapshot).unwrap();
        assert!(!dir.path().join(SNAPSHOT_TMP).exists());
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_second_store_cannot_open_locked_dir() {
        let dir = tempfile::tempdir().unwrap();
        let _store = SnapshotStore::open(dir.path(), 0).unwrap();
        assert!(matches!(
            SnapshotStore::open(dir.path(), 0),
            Err(PersistenceError::AlreadyLocked { .. })
        ));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        drop(SnapshotStore::open(dir.path(), 0).unwrap());
        assert!(SnapshotStore::open(dir.path(), 0).is_ok());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path(), 0).unwrap();
        fs::write(store.snapshot_path(), b"\x01garbage").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_refuses_to_fill_the_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path(), u64::MAX).unwrap();
        assert!(matches!(
            store.save(&sample_snapshot()),
            Err(PersistenceError::InsufficientSpace { .. })
        ));
        assert!(!store.snapshot_path().exists());
    }
}
