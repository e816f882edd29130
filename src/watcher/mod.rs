//! Filesystem change watching for the logs root.
//!
//! [`ChangeWatcher`] turns notify events into [`ChangeEvent`]s and
//! [`IndexWorker`] applies them to the index one at a time.
//!
//! [`ChangeEvent`]: crate::index::ChangeEvent

mod change_watcher;
mod error;
mod events;
mod worker;

pub use change_watcher::{ChangeWatcher, WatchOptions, DEFAULT_DEBOUNCE, DEFAULT_EVENT_BUFFER};
pub use error::WatcherError;
pub use events::translate;
pub use worker::IndexWorker;
