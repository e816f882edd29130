//! Live tree index of the logs directory.
//!
//! [`TreeBuilder`] scans the root into a [`LogIndex`], [`IndexMutator`]
//! applies [`ChangeEvent`]s to it, and [`SnapshotReader`] serves read-only
//! copies to consumers.

mod builder;
mod entry;
mod error;
mod filter;
mod mutator;
mod snapshot;
mod store;

pub use builder::{stat_entry, TreeBuilder};
pub use entry::{
    entry_name, Entry, EntryKind, EntrySummary, FileDescriptor, IndexStats, TreeNode,
    BYTES_PER_KIB,
};
pub use error::IndexError;
pub use filter::{EntryFilter, IndexScope, DEFAULT_EXCLUDED_SUFFIXES, DEFAULT_MAX_DEPTH};
pub use mutator::{ChangeEvent, IndexMutator, SharedIndex};
pub use snapshot::SnapshotReader;
pub use store::{LogIndex, NodeId, ParentSlot, ScannedNode};
