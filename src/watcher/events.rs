//! Translation of raw notify events into index operations.

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};

use crate::index::{ChangeEvent, IndexScope};

/// Map one notify event to zero or more semantic events.
///
/// Paths outside `scope` are dropped. An event flagged for rescan maps to a
/// single [`ChangeEvent::Ready`].
#[must_use]
pub fn translate(event: &notify::Event, scope: &IndexScope) -> Vec<ChangeEvent> {
    if event.need_rescan() {
        return vec![ChangeEvent::Ready];
    }

    let paths = event.paths.iter().filter(|p| scope.admits(p)).cloned();

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.map(ChangeEvent::Added).collect()
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.map(ChangeEvent::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => rename_both(&event.paths, scope),
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|p| {
                if p.exists() {
                    ChangeEvent::Added(p)
                } else {
                    ChangeEvent::Removed(p)
                }
            })
            .collect(),
        EventKind::Modify(_) => paths.map(ChangeEvent::Modified).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// A rename carrying `[from, to]`; either side may fall outside the scope.
fn rename_both(paths: &[PathBuf], scope: &IndexScope) -> Vec<ChangeEvent> {
    let mut events = Vec::with_capacity(2);
    if let Some(from) = paths.first().filter(|p| scope.admits(p)) {
        events.push(ChangeEvent::Removed(from.clone()));
    }
    if let Some(to) = paths.get(1).filter(|p| scope.admits(p)) {
        events.push(ChangeEvent::Added(to.clone()));
    }
    events
}
