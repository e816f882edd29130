//! Errors raised while subscribing to the logs root.

use std::path::PathBuf;

/// Startup failures of the [`super::ChangeWatcher`].
///
/// Once running, the watcher never fails; lost notifications are turned
/// into a rescan instead.
#[derive(thiserror::Error, Debug)]
pub enum WatcherError {
    #[error("Logs root is not a directory: {0}")]
    RootMissing(PathBuf),

    /// The platform refused the recursive subscription, e.g. the inotify
    /// watch limit was reached.
    #[error("Cannot watch logs root: {0}")]
    Notify(#[from] notify::Error),

    /// The bridge thread could not be spawned.
    #[error("Cannot start watcher thread: {0}")]
    BridgeSpawn(#[from] std::io::Error),

    #[error("Event channel closed before the initial scan was queued")]
    ChannelClosed,
}
