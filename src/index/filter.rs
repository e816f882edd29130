//! Exclusion policy shared by the scanner, the mutator and the watcher.

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use super::error::IndexError;

/// Suffixes excluded by default: audit sidecars and rotated archives.
pub const DEFAULT_EXCLUDED_SUFFIXES: &[&str] = &["-audit.json", ".gz"];

/// Decides which names may enter the index.
///
/// A name is excluded when it ends with one of the configured suffixes, or,
/// with `ignore_hidden`, when it starts with a dot.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    suffixes: Option<Regex>,
    ignore_hidden: bool,
}

impl EntryFilter {
    /// Create a filter from a list of literal suffixes.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined suffix pattern fails to compile.
    pub fn new<S: AsRef<str>>(suffixes: &[S], ignore_hidden: bool) -> Result<Self, IndexError> {
        let alternatives: Vec<String> = suffixes
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .map(regex::escape)
            .collect();

        let suffixes = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("(?:{})$", alternatives.join("|")))?)
        };

        Ok(Self {
            suffixes,
            ignore_hidden,
        })
    }

    /// Filter that admits everything.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            suffixes: None,
            ignore_hidden: false,
        }
    }

    /// Whether an entry with this base name may be indexed.
    #[must_use]
    pub fn admits_name(&self, name: &str) -> bool {
        if self.ignore_hidden && name.starts_with('.') {
            return false;
        }
        !self.suffixes.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Whether a path below `root` may be indexed.
    ///
    /// Every component between the root and the final name is checked for
    /// hidden segments; the final name is checked against the full policy.
    #[must_use]
    pub fn admits_relative(&self, relative: &Path) -> bool {
        let names: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();

        let Some((last, ancestors)) = names.split_last() else {
            return true;
        };

        if self.ignore_hidden && ancestors.iter().any(|n| n.starts_with('.')) {
            return false;
        }
        self.admits_name(last)
    }
}

/// Default number of directory levels indexed below the root.
pub const DEFAULT_MAX_DEPTH: usize = 99;

/// The region of the filesystem the index covers: a root, an exclusion
/// filter, and a depth bound.
#[derive(Debug, Clone)]
pub struct IndexScope {
    root: PathBuf,
    filter: EntryFilter,
    max_depth: usize,
}

impl IndexScope {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, filter: EntryFilter) -> Self {
        Self {
            root: root.into(),
            filter,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of components between the root and `path`, or `None` when
    /// `path` is not below the root.
    #[must_use]
    pub fn depth_of(&self, path: &Path) -> Option<usize> {
        path.strip_prefix(&self.root)
            .ok()
            .map(|relative| relative.components().count())
    }

    /// Whether `path` is strictly below the root, within the depth bound,
    /// and admitted by the filter.
    #[must_use]
    pub fn admits(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let depth = relative.components().count();
        depth > 0 && depth <= self.max_depth && self.filter.admits_relative(relative)
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_SUFFIXES, true).unwrap_or_else(|_| Self::allow_all())
    }
}
