//! Lock-scoped, atomic registry update.

use crate::reconcile::{Reconciliation, reconcile};
use crate::registry_file::{
    RegistryFileError, RegistryFormat, read_registry, read_registry_text, registry_digest,
    write_registry, write_text_atomically,
};
use crate::snapshot::SnapshotEntry;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn registry_lock_path(registry_path: &Path) -> PathBuf {
    let mut path: OsString = registry_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

/// Outcome of one locked reconciliation pass.
#[derive(Debug, Clone)]
pub struct RegistryUpdate {
    pub reconciliation: Reconciliation,
    /// Whether the file content changed (and was rewritten).
    pub changed: bool,
    /// Digest of the registry text now on disk.
    pub digest: String,
}

/// Reconcile the registry at `path` with `snapshots` under an exclusive lock.
///
/// The existing registry is read first; if it cannot be read or parsed the
/// pass aborts and the file is left exactly as it was. The file is only
/// rewritten when the serialized registry differs from its current content.
pub fn update_registry_file(
    path: impl AsRef<Path>,
    format: &RegistryFormat,
    snapshots: &BTreeMap<String, Vec<SnapshotEntry>>,
    as_of: DateTime<Utc>,
) -> Result<RegistryUpdate, RegistryFileError> {
    let path = path.as_ref();
    let _guard = RegistryLockGuard::acquire(path)?;

    let current_text = read_registry_text(path)?;
    let existing = match current_text.as_deref() {
        Some(text) => {
            read_registry(text, format).map_err(|e| RegistryFileError::registry(path, e))?
        }
        None => Vec::new(),
    };

    let reconciliation = reconcile(&existing, snapshots, as_of);
    let text = write_registry(&reconciliation.records, format)
        .map_err(|e| RegistryFileError::registry(path, e))?;

    let changed = current_text.as_deref() != Some(text.as_str());
    if changed {
        write_text_atomically(path, &text)?;
    } else {
        tracing::info!(path = %path.display(), "registry unchanged; not rewritten");
    }

    Ok(RegistryUpdate {
        reconciliation,
        changed,
        digest: registry_digest(&text),
    })
}

struct RegistryLockGuard {
    lock_path: PathBuf,
    _file: File,
}

impl RegistryLockGuard {
    fn acquire(path: &Path) -> Result<Self, RegistryFileError> {
        let lock_path = registry_lock_path(path);
        let lock_io = |message: String| RegistryFileError::LockIo {
            lock_path: lock_path.display().to_string(),
            message,
        };
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| lock_io(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::AlreadyExists => RegistryFileError::LockBusy {
                    lock_path: lock_path.display().to_string(),
                },
                _ => lock_io(err.to_string()),
            })?;
        // Holder details only; the lock is held even if this write fails.
        let _ = writeln!(file, "pid={} since={}", std::process::id(), Utc::now().to_rfc3339());
        Ok(Self {
            lock_path,
            _file: file,
        })
    }
}

impl Drop for RegistryLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
