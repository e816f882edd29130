//! Service context owning the live index and its background tasks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{resolve_root, ConfigError, IndexSettings};
use crate::dashboard::DashboardError;
use crate::index::{
    EntryFilter, IndexError, IndexMutator, IndexScope, SnapshotReader, TreeBuilder,
};
use crate::watcher::{ChangeWatcher, IndexWorker, WatchOptions, WatcherError};

/// Errors that stop the service from starting or running.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Watcher(#[from] WatcherError),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}

/// The running index: watcher, worker and the shared store.
///
/// Dropping the service cancels its token, which stops the worker; call
/// [`LogService::shutdown`] to also wait for the background tasks.
pub struct LogService {
    reader: SnapshotReader,
    watcher: Option<ChangeWatcher>,
    worker: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl LogService {
    /// Resolve the configured root against `base` and start indexing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved or watched, or the
    /// exclusion patterns are invalid.
    pub fn start(
        settings: &IndexSettings,
        base: &Path,
        cancel: CancellationToken,
    ) -> Result<Self, ServiceError> {
        let root = resolve_root(&settings.root, base)?;
        Self::start_at(root, settings, cancel)
    }

    /// Start indexing an already resolved root.
    ///
    /// The watcher's initial `Ready` event triggers the first scan on the
    /// worker, so the reader reports not ready until that completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be watched or the exclusion
    /// patterns are invalid.
    pub fn start_at(
        root: PathBuf,
        settings: &IndexSettings,
        cancel: CancellationToken,
    ) -> Result<Self, ServiceError> {
        let filter = EntryFilter::new(&settings.exclude_suffixes, settings.ignore_hidden)?;
        let scope = IndexScope::new(root, filter).with_max_depth(settings.max_depth);

        let mutator = IndexMutator::new(TreeBuilder::from_scope(scope.clone()));
        let reader = mutator.reader();

        let options = WatchOptions {
            debounce: settings.debounce(),
            buffer: settings.event_buffer,
        };
        let (watcher, events) = ChangeWatcher::new(scope, options)?;

        let worker = IndexWorker::new(mutator)
            .with_rescan_interval(settings.rescan_interval())
            .spawn(events, cancel.clone());

        tracing::info!(
            root = %reader.root().display(),
            max_depth = settings.max_depth,
            "Log index service started"
        );

        Ok(Self {
            reader,
            watcher: Some(watcher),
            worker: Some(worker),
            cancel,
        })
    }

    /// Read access to the live index.
    #[must_use]
    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.reader.root()
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait until the initial scan is installed.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_ready(&self, timeout: Duration) -> bool {
        let poll = async {
            while !self.reader.is_ready() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.is_ok()
    }

    /// Stop the worker and the watcher and wait for both.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "Index worker ended abnormally");
            }
        }

        if let Some(watcher) = self.watcher.take() {
            if let Err(e) = tokio::task::spawn_blocking(move || watcher.shutdown()).await {
                tracing::warn!(error = %e, "Watcher shutdown failed");
            }
        }

        tracing::info!("Log index service stopped");
    }
}

impl Drop for LogService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
