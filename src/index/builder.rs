//! Recursive directory scanner producing a fresh index.

use std::path::{Path, PathBuf};

use super::entry::Entry;
use super::error::IndexError;
use super::filter::{EntryFilter, IndexScope};
use super::store::{LogIndex, ParentSlot, ScannedNode};

/// Walks the root directory synchronously.
///
/// Unreadable entries and directories are logged and skipped; a scan never
/// fails as a whole.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    scope: IndexScope,
}

impl TreeBuilder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, filter: EntryFilter) -> Self {
        Self::from_scope(IndexScope::new(root, filter))
    }

    #[must_use]
    pub fn from_scope(scope: IndexScope) -> Self {
        Self { scope }
    }

    /// Limit how many directory levels below the root are scanned.
    #[must_use]
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self::from_scope(self.scope.with_max_depth(max_depth))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.scope.root()
    }

    #[must_use]
    pub fn scope(&self) -> &IndexScope {
        &self.scope
    }

    /// Scan the whole root into a new, installed index.
    #[must_use]
    pub fn build(&self) -> LogIndex {
        let mut index = LogIndex::new(self.root());
        for node in self.scan_dir(self.root(), 0) {
            index.graft(ParentSlot::Root, node);
        }
        index.mark_installed();

        tracing::debug!(
            root = %self.root().display(),
            entries = index.len(),
            "Index scan complete"
        );
        index
    }

    /// Stat a single path and, for directories, scan its subtree.
    ///
    /// Returns `None` for a symlink to a directory, which is never indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the path itself cannot be stat'ed. Failures
    /// below it are logged and skipped.
    pub fn scan_entry(&self, path: &Path) -> Result<Option<ScannedNode>, IndexError> {
        let Some(entry) = stat_indexable(path)? else {
            return Ok(None);
        };
        let children = if entry.is_dir() {
            let depth = self.scope.depth_of(path).unwrap_or(usize::MAX);
            self.scan_dir(path, depth)
        } else {
            Vec::new()
        };
        Ok(Some(ScannedNode { entry, children }))
    }

    fn scan_dir(&self, dir: &Path, depth: usize) -> Vec<ScannedNode> {
        if depth >= self.scope.max_depth() {
            return Vec::new();
        }

        let listing = match std::fs::read_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Error reading directory");
                return Vec::new();
            }
        };

        let mut nodes = Vec::new();
        for item in listing {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Error reading directory entry");
                    continue;
                }
            };

            if !self.scope.filter().admits_name(&item.file_name().to_string_lossy()) {
                continue;
            }

            let path = item.path();
            let entry = match stat_indexable(&path) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping entry");
                    continue;
                }
            };

            let children = if entry.is_dir() {
                self.scan_dir(&path, depth + 1)
            } else {
                Vec::new()
            };
            nodes.push(ScannedNode { entry, children });
        }
        nodes
    }
}

/// Stat a path (following symlinks) into an entry.
///
/// # Errors
///
/// Returns [`IndexError::Io`] if the metadata cannot be read.
pub fn stat_entry(path: &Path) -> Result<Entry, IndexError> {
    std::fs::metadata(path)
        .and_then(|metadata| Entry::from_metadata(path, &metadata))
        .map_err(|e| IndexError::io(path, e))
}

/// Stat a path for the walk.
///
/// File symlinks are followed for size and mtime. Symlinked directories
/// yield `None` and are never descended into.
fn stat_indexable(path: &Path) -> Result<Option<Entry>, IndexError> {
    let link = std::fs::symlink_metadata(path).map_err(|e| IndexError::io(path, e))?;
    let entry = stat_entry(path)?;
    if link.file_type().is_symlink() && entry.is_dir() {
        tracing::debug!(path = %path.display(), "Skipping symlinked directory");
        return Ok(None);
    }
    Ok(Some(entry))
}
