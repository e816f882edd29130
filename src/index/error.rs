//! Index error types.

use std::path::PathBuf;

/// Errors surfaced by the log index.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The path is not present in the index.
    #[error("Not indexed: {0}")]
    NotIndexed(PathBuf),

    /// The path resolves outside the indexed root.
    #[error("Access denied: {0} is outside the logs root")]
    OutOfScope(PathBuf),

    /// The path is indexed but names a directory.
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// Transient filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An exclusion pattern failed to compile.
    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
