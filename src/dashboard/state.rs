//! Shared state for dashboard handlers.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::index::SnapshotReader;

/// Default period between SSE pushes.
pub const DEFAULT_STREAM_INTERVAL: Duration = Duration::from_secs(10);

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read access to the live index.
    pub reader: SnapshotReader,
    /// Period of the `/logs/stream` feed.
    pub stream_interval: Duration,
    /// Whether pages link the `/assets` stylesheet and script.
    pub with_assets: bool,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

impl AppState {
    #[must_use]
    pub fn new(reader: SnapshotReader, cancel: CancellationToken) -> Self {
        Self {
            reader,
            stream_interval: DEFAULT_STREAM_INTERVAL,
            with_assets: false,
            cancel,
        }
    }

    /// Set the SSE push period (builder pattern).
    #[must_use]
    pub fn with_stream_interval(mut self, interval: Duration) -> Self {
        self.stream_interval = interval.max(Duration::from_millis(1));
        self
    }

    #[must_use]
    pub fn with_assets(mut self, with_assets: bool) -> Self {
        self.with_assets = with_assets;
        self
    }
}
