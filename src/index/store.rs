//! Arena-backed tree with a path-keyed side index.
//!
//! Entries are owned by arena slots. The tree links (`roots`, `children`)
//! and the flat index both hold [`NodeId`] handles, so there is a single
//! ownership claim per entry and path lookups are O(1).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::entry::{Entry, EntryKind, EntrySummary, FileDescriptor, IndexStats, TreeNode};

/// Handle to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Where a new entry is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSlot {
    /// Directly below the indexed root.
    Root,
    /// Below an indexed directory.
    Dir(NodeId),
}

/// A scanned entry together with its (already scanned) descendants.
#[derive(Debug, Clone)]
pub struct ScannedNode {
    pub entry: Entry,
    pub children: Vec<ScannedNode>,
}

impl ScannedNode {
    #[must_use]
    pub fn leaf(entry: Entry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Node {
    entry: Entry,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The tree of indexed entries plus the flat path index.
#[derive(Debug)]
pub struct LogIndex {
    root: PathBuf,
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
    by_path: HashMap<PathBuf, NodeId>,
    installed: bool,
}

impl LogIndex {
    /// Create an empty, not yet installed index for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            by_path: HashMap::new(),
            installed: false,
        }
    }

    /// The indexed root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a full scan has populated this index.
    ///
    /// Until then the root itself does not count as an indexed parent.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub(crate) fn mark_installed(&mut self) {
        self.installed = true;
    }

    /// Number of entries in the flat index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    /// Look up an entry by absolute path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Entry> {
        self.by_path.get(path).and_then(|id| self.entry(*id))
    }

    pub(crate) fn get_mut(&mut self, path: &Path) -> Option<&mut Entry> {
        let id = *self.by_path.get(path)?;
        self.node_mut(id).map(|node| &mut node.entry)
    }

    #[must_use]
    pub fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.node(id).map(|node| &node.entry)
    }

    /// Children of a directory, in discovery order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Top-level entries, in discovery order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Summary of a single entry.
    #[must_use]
    pub fn summary(&self, path: &Path) -> Option<EntrySummary> {
        let id = *self.by_path.get(path)?;
        let node = self.node(id)?;
        Some(EntrySummary {
            name: node.entry.name.clone(),
            path: node.entry.path.clone(),
            size_kib: node.entry.size_kib(),
            modified: node.entry.modified,
            kind: node.entry.kind,
            child_count: node.children.len(),
        })
    }

    /// Find the slot a new entry at `path` would attach to.
    ///
    /// Returns `None` when the parent is not indexed (or is a file).
    #[must_use]
    pub fn resolve_parent(&self, path: &Path) -> Option<ParentSlot> {
        let parent = path.parent()?;
        if parent == self.root {
            return self.installed.then_some(ParentSlot::Root);
        }
        let id = *self.by_path.get(parent)?;
        self.entry(id)
            .filter(|entry| entry.is_dir())
            .map(|_| ParentSlot::Dir(id))
    }

    /// Attach an entry below `parent`.
    ///
    /// Returns `None` without changing anything if the path is already
    /// indexed or `parent` is not a live directory.
    pub fn insert(&mut self, parent: ParentSlot, entry: Entry) -> Option<NodeId> {
        if self.by_path.contains_key(&entry.path) {
            return None;
        }

        let parent_id = match parent {
            ParentSlot::Root => None,
            ParentSlot::Dir(id) => {
                if !self.entry(id).is_some_and(Entry::is_dir) {
                    return None;
                }
                Some(id)
            }
        };

        let path = entry.path.clone();
        let id = self.allocate(Node {
            entry,
            parent: parent_id,
            children: Vec::new(),
        });

        match parent_id {
            None => self.roots.push(id),
            Some(pid) => {
                if let Some(node) = self.node_mut(pid) {
                    node.children.push(id);
                }
            }
        }
        self.by_path.insert(path, id);
        Some(id)
    }

    /// Attach a scanned subtree below `parent`.
    ///
    /// Descendants whose path is already indexed are skipped.
    pub fn graft(&mut self, parent: ParentSlot, scanned: ScannedNode) -> Option<NodeId> {
        let ScannedNode { entry, children } = scanned;
        let id = self.insert(parent, entry)?;
        for child in children {
            self.graft(ParentSlot::Dir(id), child);
        }
        Some(id)
    }

    /// Remove an entry and every descendant.
    ///
    /// The path is detached from its parent's children and dropped from the
    /// flat index together with all descendant paths. Returns the number of
    /// entries released; 0 when the path was not indexed.
    pub fn remove(&mut self, path: &Path) -> usize {
        let Some(id) = self.by_path.remove(path) else {
            return 0;
        };

        let parent = self.node(id).and_then(|node| node.parent);
        match parent {
            None => self.roots.retain(|r| *r != id),
            Some(pid) => {
                if let Some(node) = self.node_mut(pid) {
                    node.children.retain(|c| *c != id);
                }
            }
        }

        let mut released = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.slots.get_mut(current.0).and_then(Option::take) else {
                continue;
            };
            self.free.push(current.0);
            if current != id {
                self.by_path.remove(&node.entry.path);
            }
            stack.extend(node.children);
            released += 1;
        }
        released
    }

    /// Owned copy of the whole tree.
    #[must_use]
    pub fn tree(&self) -> Vec<TreeNode> {
        self.roots.iter().filter_map(|id| self.tree_node(*id)).collect()
    }

    fn tree_node(&self, id: NodeId) -> Option<TreeNode> {
        let node = self.node(id)?;
        let children = match node.entry.kind {
            EntryKind::File => None,
            EntryKind::Directory => Some(
                node.children
                    .iter()
                    .filter_map(|child| self.tree_node(*child))
                    .collect(),
            ),
        };
        Some(TreeNode {
            name: node.entry.name.clone(),
            path: node.entry.path.clone(),
            size_kib: node.entry.size_kib(),
            modified: node.entry.modified,
            kind: node.entry.kind,
            children,
        })
    }

    /// Files in depth-first pre-order; directories are traversed, not emitted.
    #[must_use]
    pub fn flatten_files(&self) -> Vec<FileDescriptor> {
        let mut files = Vec::new();
        self.visit(|entry| {
            if entry.kind == EntryKind::File {
                files.push(FileDescriptor::from(entry));
            }
        });
        files
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::default();
        self.visit(|entry| match entry.kind {
            EntryKind::File => {
                stats.files += 1;
                stats.total_bytes += entry.size;
            }
            EntryKind::Directory => stats.directories += 1,
        });
        stats
    }

    /// Paths of every entry reachable from the roots, in pre-order.
    #[must_use]
    pub fn reachable_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        self.visit(|entry| paths.push(entry.path.clone()));
        paths
    }

    /// Check that the tree and the flat index describe the same entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let reachable = self.reachable_paths();
        reachable.len() == self.by_path.len()
            && reachable.iter().all(|path| {
                self.by_path
                    .get(path)
                    .and_then(|id| self.entry(*id))
                    .is_some_and(|entry| entry.path == *path)
            })
    }

    fn visit(&self, mut f: impl FnMut(&Entry)) {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            f(&node.entry);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(node);
            NodeId(slot)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}
