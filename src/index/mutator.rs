//! Applies semantic filesystem events to the shared index.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::builder::TreeBuilder;
use super::entry::EntryKind;
use super::snapshot::SnapshotReader;
use super::store::LogIndex;

/// Semantic operations derived from raw filesystem notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The watcher finished subscribing, or lost events and needs a rescan.
    Ready,
    /// A path appeared.
    Added(PathBuf),
    /// A path's contents or metadata changed.
    Modified(PathBuf),
    /// A path disappeared.
    Removed(PathBuf),
}

impl ChangeEvent {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Ready => None,
            Self::Added(p) | Self::Modified(p) | Self::Removed(p) => Some(p),
        }
    }
}

/// Index handle shared by the mutator and every reader.
#[derive(Debug, Clone)]
pub struct SharedIndex(Arc<RwLock<LogIndex>>);

impl SharedIndex {
    #[must_use]
    pub fn new(index: LogIndex) -> Self {
        Self(Arc::new(RwLock::new(index)))
    }

    /// Shared access for one traversal.
    ///
    /// A poisoned lock is recovered: every write leaves the index consistent
    /// before any point that could panic.
    pub fn read(&self) -> RwLockReadGuard<'_, LogIndex> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, LogIndex> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Single writer over the shared index.
///
/// Filesystem I/O happens before the write lock is taken; the lock is held
/// only for the in-memory update. Callers must not run two handlers
/// concurrently (see [`crate::watcher::IndexWorker`]).
#[derive(Debug, Clone)]
pub struct IndexMutator {
    index: SharedIndex,
    builder: TreeBuilder,
}

impl IndexMutator {
    /// Create a mutator over an empty, not yet installed index.
    #[must_use]
    pub fn new(builder: TreeBuilder) -> Self {
        let index = SharedIndex::new(LogIndex::new(builder.root()));
        Self { index, builder }
    }

    /// A read-only view over the same index.
    #[must_use]
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(self.index.clone())
    }

    #[must_use]
    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    /// Dispatch an event to its handler.
    pub fn apply(&self, event: &ChangeEvent) {
        match event {
            ChangeEvent::Ready => {
                self.on_ready();
            }
            ChangeEvent::Added(path) => {
                self.on_added(path);
            }
            ChangeEvent::Modified(path) => {
                self.on_modified(path);
            }
            ChangeEvent::Removed(path) => {
                self.on_removed(path);
            }
        }
    }

    /// Rescan the root and replace the current index with the result.
    ///
    /// Returns the number of indexed entries.
    pub fn on_ready(&self) -> usize {
        let fresh = self.builder.build();
        let entries = fresh.len();
        let stale = std::mem::replace(&mut *self.index.write(), fresh);
        drop(stale);

        tracing::info!(
            root = %self.builder.root().display(),
            entries,
            "Initial scan complete, ready for changes"
        );
        entries
    }

    /// Index a newly created path.
    ///
    /// Returns `true` if the index changed. Excluded paths, paths already
    /// indexed, and paths whose parent is not indexed are dropped.
    pub fn on_added(&self, path: &Path) -> bool {
        if !self.builder.scope().admits(path) {
            tracing::trace!(path = %path.display(), "Ignoring excluded path");
            return false;
        }

        {
            let index = self.index.read();
            if index.contains(path) {
                return false;
            }
            if index.resolve_parent(path).is_none() {
                tracing::debug!(path = %path.display(), "Parent not indexed, dropping add");
                return false;
            }
        }

        let scanned = match self.builder.scan_entry(path) {
            Ok(Some(scanned)) => scanned,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "Error processing new entry");
                return false;
            }
        };

        let mut index = self.index.write();
        let Some(parent) = index.resolve_parent(path) else {
            return false;
        };
        let added = index.graft(parent, scanned).is_some();
        if added {
            tracing::info!(path = %path.display(), "Entry added");
        }
        added
    }

    /// Refresh size and modification time of an indexed file.
    ///
    /// Returns `true` if the entry was updated. Unknown paths and
    /// directories are ignored; a failed stat leaves the entry unchanged.
    pub fn on_modified(&self, path: &Path) -> bool {
        if !self
            .index
            .read()
            .get(path)
            .is_some_and(|entry| entry.kind == EntryKind::File)
        {
            return false;
        }

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error updating entry");
                return false;
            }
        };

        let mut index = self.index.write();
        let Some(entry) = index.get_mut(path) else {
            return false;
        };
        match entry.refresh(&metadata) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), size = entry.size, "Entry changed");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error updating entry");
                false
            }
        }
    }

    /// Drop a path, and everything below it, from the tree and the flat index.
    ///
    /// Returns the number of entries released.
    pub fn on_removed(&self, path: &Path) -> usize {
        let released = self.index.write().remove(path);
        if released > 0 {
            tracing::info!(path = %path.display(), released, "Entry removed");
        }
        released
    }
}
