//! Snapshot storage backends for the server.
//!
//! Carts are snapshotted through [`repx_core::SnapshotStore`]. With
//! `REPX_DATA_DIR` set each snapshot slot is a JSON file in that directory;
//! otherwise snapshots live in process memory and vanish on restart.
//!
//! [`SnapshotStore`] is synchronous and is called with the shopper's lock
//! held. Snapshots are a few hundred bytes, so the file store does its I/O
//! inline, stepping off the worker with `block_in_place` when it runs on a
//! multi-threaded runtime.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use repx_core::persistence::SNAPSHOT_KEY;
use repx_core::{MemoryStore, SnapshotStore, StoreError};
use tokio::runtime::{Handle, RuntimeFlavor};
use uuid::Uuid;

/// Prefix of the slot holding a shopper's checkout awaiting payment.
const CHECKOUT_KEY: &str = "repx_checkout";

/// Snapshot store shared by every shopper.
pub type SharedStore = Arc<dyn SnapshotStore + Send + Sync>;

/// Build the store selected by configuration.
#[must_use]
pub fn shared_store(data_dir: Option<&Path>) -> SharedStore {
    match data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Persisting cart snapshots to disk");
            Arc::new(FileSnapshotStore::new(dir))
        }
        None => {
            tracing::warn!("REPX_DATA_DIR not set; carts will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Snapshot slot name for one shopper.
#[must_use]
pub fn shopper_key(shopper_id: Uuid) -> String {
    format!("{SNAPSHOT_KEY}-{shopper_id}")
}

/// Slot name for a shopper's checkout awaiting payment.
#[must_use]
pub fn checkout_key(shopper_id: Uuid) -> String {
    format!("{CHECKOUT_KEY}-{shopper_id}")
}

/// Run blocking file I/O, yielding the worker thread when inside a
/// multi-threaded tokio runtime. `block_in_place` panics elsewhere, so other
/// callers (current-thread runtimes, the CLI) run it directly.
fn blocking_io<T>(io: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(io)
        }
        _ => io(),
    }
}

/// One file per slot: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Unavailable(format!(
                "snapshot key {key:?} is not a safe file name"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        blocking_io(|| -> Result<Option<String>, StoreError> {
            match std::fs::read_to_string(path) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        blocking_io(|| -> Result<(), StoreError> {
            std::fs::create_dir_all(&self.dir)?;
            // Write-then-rename so a crash never leaves a half-written snapshot.
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, value)?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        })
    }
}
