//! Read-only access to the live index.

use std::path::{Component, Path, PathBuf};

use super::entry::{EntrySummary, FileDescriptor, IndexStats, TreeNode};
use super::error::IndexError;
use super::mutator::SharedIndex;

/// Cheap, cloneable reader over the shared index.
///
/// Every call takes the shared lock for one traversal and returns owned
/// data, so callers never observe a half-applied mutation.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    index: SharedIndex,
    root: PathBuf,
}

impl SnapshotReader {
    #[must_use]
    pub fn new(index: SharedIndex) -> Self {
        let root = index.read().root().to_path_buf();
        Self { index, root }
    }

    /// The indexed root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether an initial scan has been installed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.index.read().is_installed()
    }

    /// Full hierarchical copy of the tree.
    #[must_use]
    pub fn current_tree(&self) -> Vec<TreeNode> {
        self.index.read().tree()
    }

    /// Every indexed file, depth-first.
    #[must_use]
    pub fn flatten_files(&self) -> Vec<FileDescriptor> {
        self.index.read().flatten_files()
    }

    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<EntrySummary> {
        self.index.read().summary(path)
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.index.read().stats()
    }

    /// Number of entries in the flat path index.
    #[must_use]
    pub fn indexed_count(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the tree and the flat index describe the same entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.index.read().is_consistent()
    }

    /// Validate a client-supplied path before any of its contents are read.
    ///
    /// Relative paths are taken relative to the root. The path must stay
    /// inside the root both lexically and after symlink resolution, must be
    /// indexed, and must be a file. Returns the canonical path.
    ///
    /// # Errors
    ///
    /// - [`IndexError::OutOfScope`] if the path escapes the root
    /// - [`IndexError::NotIndexed`] if it does not exist or is excluded
    /// - [`IndexError::NotAFile`] if it names a directory
    /// - [`IndexError::Io`] if canonicalisation fails for another reason
    pub fn resolve_file(&self, requested: &Path) -> Result<PathBuf, IndexError> {
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let normalized = normalize_lexically(&joined);
        if !normalized.starts_with(&self.root) {
            return Err(IndexError::OutOfScope(normalized));
        }

        let canonical = match std::fs::canonicalize(&normalized) {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::NotIndexed(normalized));
            }
            Err(e) => return Err(IndexError::io(normalized, e)),
        };
        if !canonical.starts_with(&self.root) {
            return Err(IndexError::OutOfScope(canonical));
        }

        match self.index.read().get(&canonical) {
            None => Err(IndexError::NotIndexed(canonical)),
            Some(entry) if entry.is_dir() => Err(IndexError::NotAFile(canonical)),
            Some(_) => Ok(canonical),
        }
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
