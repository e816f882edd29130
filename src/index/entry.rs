//! Index entry types and the read-only views handed to consumers.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bytes per kibibyte, the unit sizes are displayed in.
pub const BYTES_PER_KIB: f64 = 1024.0;

/// Kind of filesystem object an entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One indexed filesystem object.
///
/// `name`, `path` and `kind` never change after creation; only `size` and
/// `modified` are refreshed in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    /// Size in bytes. Always 0 for directories.
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub kind: EntryKind,
}

impl Entry {
    /// Build an entry from a path and its (symlink-following) metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot report a modification time.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> std::io::Result<Self> {
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size = match kind {
            EntryKind::File => metadata.len(),
            EntryKind::Directory => 0,
        };

        Ok(Self {
            name: entry_name(path),
            path: path.to_path_buf(),
            size,
            modified: DateTime::<Utc>::from(metadata.modified()?),
            kind,
        })
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Size scaled to kibibytes for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kib(&self) -> f64 {
        self.size as f64 / BYTES_PER_KIB
    }

    /// Refresh the mutable fields from fresh metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the modification time is unavailable; the entry
    /// is left untouched in that case.
    pub fn refresh(&mut self, metadata: &Metadata) -> std::io::Result<()> {
        let modified = DateTime::<Utc>::from(metadata.modified()?);
        if self.kind == EntryKind::File {
            self.size = metadata.len();
        }
        self.modified = modified;
        Ok(())
    }
}

/// Base name of a path, falling back to the whole path for roots.
#[must_use]
pub fn entry_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Owned hierarchical view of one entry, used for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    pub size_kib: f64,
    pub modified: DateTime<Utc>,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

/// A file in the flattened listing pushed to streaming clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub path: PathBuf,
    pub size_kib: f64,
    pub modified: DateTime<Utc>,
}

impl From<&Entry> for FileDescriptor {
    fn from(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            size_kib: entry.size_kib(),
            modified: entry.modified,
        }
    }
}

/// Result of a single-path lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub name: String,
    pub path: PathBuf,
    pub size_kib: f64,
    pub modified: DateTime<Utc>,
    pub kind: EntryKind,
    /// Number of direct children; 0 for files.
    pub child_count: usize,
}

/// Aggregate counters over the whole index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub files: usize,
    pub directories: usize,
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_from_file_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        let entry = Entry::from_metadata(&path, &metadata).unwrap();

        assert_eq!(entry.name, "app.log");
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 2048);
        assert!((entry.size_kib() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_directory_size_is_zero() {
        let temp_dir = TempDir::new().unwrap();
        let metadata = std::fs::metadata(temp_dir.path()).unwrap();
        let entry = Entry::from_metadata(temp_dir.path(), &metadata).unwrap();

        assert!(entry.is_dir());
        assert_eq!(entry.size, 0);
    }

    #[test]
    fn test_entry_name_of_root() {
        assert_eq!(entry_name(Path::new("/")), "/");
        assert_eq!(entry_name(Path::new("/var/log/syslog")), "syslog");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntryKind::Directory).unwrap();
        assert_eq!(json, "\"directory\"");
    }

    #[test]
    fn test_tree_node_omits_children_for_files() {
        let node = TreeNode {
            name: "a.log".to_string(),
            path: PathBuf::from("/logs/a.log"),
            size_kib: 0.5,
            modified: Utc::now(),
            kind: EntryKind::File,
            children: None,
        };
        let json = serde_json::to_string(&node).unwrap();
        assert!(!json.contains("children"));
        assert!(json.contains("\"size_kib\":0.5"));
    }
}
