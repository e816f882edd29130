//! Recursive change watcher with notify integration.
//!
//! Subscribes to the logs root and emits [`ChangeEvent`]s on a bounded
//! tokio channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use notify_debouncer_full::{
    new_debouncer,
    notify::{self, RecursiveMode},
    DebounceEventResult,
};
use tokio::sync::mpsc;

use super::error::WatcherError;
use super::events::translate;
use crate::index::{ChangeEvent, IndexScope};

/// Default debounce window for raw notifications.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// How often the bridge thread checks for a stop request.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tuning for a [`ChangeWatcher`].
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Debounce window passed to notify-debouncer-full.
    pub debounce: Duration,
    /// Capacity of the bounded event channel.
    pub buffer: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Watches the logs root recursively.
///
/// The notify callback only forwards into an unbounded std channel; a
/// bridge thread translates and pushes into the bounded tokio channel, so a
/// slow consumer applies backpressure to the bridge and never to the
/// platform watcher. Dropping the watcher stops the bridge thread.
pub struct ChangeWatcher {
    /// The root being watched.
    root: PathBuf,
    /// Handle to stop the bridge thread.
    stop_tx: std_mpsc::Sender<()>,
    /// Handle to the bridge thread.
    bridge_handle: Option<thread::JoinHandle<()>>,
}

impl ChangeWatcher {
    /// Subscribe to the scope's root.
    ///
    /// Returns the watcher and a receiver for change events. The first
    /// event on the receiver is always [`ChangeEvent::Ready`].
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory or the subscription
    /// cannot be established.
    pub fn new(
        scope: IndexScope,
        options: WatchOptions,
    ) -> Result<(Self, mpsc::Receiver<ChangeEvent>), WatcherError> {
        let root = scope.root().to_path_buf();
        if !root.is_dir() {
            return Err(WatcherError::RootMissing(root));
        }

        let (event_tx, event_rx) = mpsc::channel(options.buffer.max(1));
        let (stop_tx, stop_rx) = std_mpsc::channel();

        // Create the notify debouncer
        let (notify_tx, notify_rx) = std_mpsc::channel();

        let mut debouncer =
            new_debouncer(options.debounce, None, move |result: DebounceEventResult| {
                let _ = notify_tx.send(result);
            })?;

        debouncer.watch(&root, RecursiveMode::Recursive)?;

        event_tx
            .try_send(ChangeEvent::Ready)
            .map_err(|_| WatcherError::ChannelClosed)?;

        tracing::info!(root = %root.display(), "Watching logs directory");

        // Bridge thread: converts std_mpsc events to tokio mpsc
        let bridge_handle = thread::Builder::new()
            .name("log-watcher".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.try_recv() {
                        Ok(()) | Err(std_mpsc::TryRecvError::Disconnected) => break,
                        Err(std_mpsc::TryRecvError::Empty) => {}
                    }

                    match notify_rx.recv_timeout(STOP_POLL_INTERVAL) {
                        Ok(result) => {
                            if !Self::forward(result, &scope, &event_tx) {
                                break;
                            }
                        }
                        Err(std_mpsc::RecvTimeoutError::Timeout) => {}
                        Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }

                // Keep debouncer alive until thread exits
                drop(debouncer);
                tracing::debug!("Watcher bridge stopped");
            })?;

        Ok((
            Self {
                root,
                stop_tx,
                bridge_handle: Some(bridge_handle),
            },
            event_rx,
        ))
    }

    /// Translate one debounce batch and push it downstream.
    ///
    /// Returns `false` once the receiver is gone.
    fn forward(
        result: DebounceEventResult,
        scope: &IndexScope,
        event_tx: &mpsc::Sender<ChangeEvent>,
    ) -> bool {
        let events: Vec<ChangeEvent> = match result {
            Ok(events) => events
                .iter()
                .flat_map(|event| translate(event, scope))
                .collect(),
            Err(errors) => {
                for error in &errors {
                    tracing::warn!(error = %error, "File watcher error, scheduling rescan");
                }
                vec![ChangeEvent::Ready]
            }
        };

        for event in events {
            tracing::trace!(?event, "Forwarding change");
            if event_tx.blocking_send(event).is_err() {
                return false;
            }
        }
        true
    }

    /// Get the root being watched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stop watching and wait for the bridge thread to exit.
    pub fn shutdown(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.bridge_handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Watcher bridge thread panicked");
            }
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
