//! Root directory resolution.

use std::path::{Path, PathBuf};

use super::loader::ConfigError;

/// Expand a leading `~` to the user's home directory.
///
/// Only `~` on its own or followed by a separator is expanded; `~user`
/// forms are returned unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDirUnavailable`] if the path needs expansion
/// but the home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use log_dashboard::config::expand_home;
///
/// let plain = expand_home("/var/log").unwrap();
/// assert_eq!(plain, std::path::PathBuf::from("/var/log"));
/// ```
pub fn expand_home(raw: &str) -> Result<PathBuf, ConfigError> {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => return Ok(PathBuf::from(raw)),
    };

    let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
    let rest = rest.trim_start_matches(['/', '\\']);
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Resolve a configured root to an absolute, canonical directory.
///
/// Relative paths are taken relative to `base` (normally the working
/// directory).
///
/// # Errors
///
/// Returns an error if home expansion fails or the directory cannot be
/// canonicalised (typically because it does not exist).
pub fn resolve_root(raw: &str, base: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_home(raw)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };

    let root = std::fs::canonicalize(&absolute).map_err(|source| ConfigError::RootUnavailable {
        path: absolute.clone(),
        source,
    })?;
    if !root.is_dir() {
        return Err(ConfigError::RootUnavailable {
            path: root,
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    Ok(root)
}
