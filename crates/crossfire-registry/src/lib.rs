//! # crossfire-registry
//!
//! The authoritative registry of exchanged tests.
//!
//! This crate provides:
//! - `TestDesc`, the registry record, and its `bizKey` identity
//! - the pipe-delimited registry file codec (portable persistence)
//! - per-author local snapshot parsing and collection
//! - the reconciliation pass that merges snapshots into the registry
//! - a lock-scoped, atomic registry update
//! - notices for recoverable failures
//!
//! Fetching forks and cloning repositories is not handled here; snapshots
//! are expected to be on disk already, one directory per author.
//!
//! ## Data flow
//!
//! ```text
//! locals/<author>/local.csv ──collect──▶ snapshots ─┐
//!                                                    ├─reconcile─▶ main.csv
//! main.csv ─────────────────read──────▶ registry ───┘
//! ```

pub mod notice;
pub mod reconcile;
pub mod registry_file;
pub mod registry_lock;
pub mod snapshot;
pub mod test_desc;

pub use notice::{
    CollectingNotifier, JsonlNotifier, LogNotifier, Notice, NoticeKind, Notifier, Notifiers,
};
pub use reconcile::{ReconcileSummary, Reconciliation, reconcile};
pub use registry_file::{
    RegistryError, RegistryFileError, RegistryFormat, read_registry, read_registry_from_path,
    registry_digest, write_registry, write_registry_to_path,
};
pub use registry_lock::{RegistryUpdate, registry_lock_path, update_registry_file};
pub use snapshot::{
    DISABLE_MARKER, SnapshotCollection, SnapshotEntry, SnapshotError, SnapshotSource,
    collect_snapshots, parse_snapshot,
};
pub use test_desc::{TestDesc, biz_key, normalize_field};
