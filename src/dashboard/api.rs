//! Request and response types for the dashboard HTTP endpoints.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::index::{IndexStats, BYTES_PER_KIB};

/// Query parameters for `/logs/view` and `/logs/download`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileQuery {
    /// Absolute path, or a path relative to the logs root.
    pub file: Option<String>,
}

impl FileQuery {
    /// The requested path, if present and non-empty.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.file
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
    }
}

/// Response for GET /api/stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Whether the initial scan has completed.
    pub ready: bool,
    /// The indexed root directory.
    pub root: PathBuf,
    pub files: usize,
    pub directories: usize,
    /// Total size of indexed files, in kibibytes.
    pub total_kib: f64,
}

impl StatsResponse {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(ready: bool, root: PathBuf, stats: IndexStats) -> Self {
        Self {
            ready,
            root,
            files: stats.files,
            directories: stats.directories,
            total_kib: stats.total_bytes as f64 / BYTES_PER_KIB,
        }
    }
}
