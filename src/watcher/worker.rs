//! Single consumer applying change events to the index.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::index::{ChangeEvent, IndexMutator};

/// Drains the watcher channel and applies each event in order.
///
/// Handlers run on the blocking pool one at a time; the next event is not
/// taken until the previous one finished, which keeps a single writer on
/// the index.
#[derive(Debug, Clone)]
pub struct IndexWorker {
    mutator: IndexMutator,
    rescan_interval: Option<Duration>,
}

impl IndexWorker {
    #[must_use]
    pub fn new(mutator: IndexMutator) -> Self {
        Self {
            mutator,
            rescan_interval: None,
        }
    }

    /// Inject a full rescan every `interval`. `None` or zero disables it.
    #[must_use]
    pub fn with_rescan_interval(mut self, interval: Option<Duration>) -> Self {
        self.rescan_interval = interval.filter(|d| !d.is_zero());
        self
    }

    /// Spawn the worker on the current runtime.
    #[must_use]
    pub fn spawn(
        self,
        events: mpsc::Receiver<ChangeEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(events, cancel))
    }

    /// Process events until the channel closes or `cancel` fires.
    pub async fn run(self, mut events: mpsc::Receiver<ChangeEvent>, cancel: CancellationToken) {
        let mut rescan = self.rescan_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            let event = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::debug!("Index worker cancelled");
                    break;
                }

                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        tracing::debug!("Change channel closed, index worker exiting");
                        break;
                    }
                },

                () = next_tick(&mut rescan) => {
                    tracing::debug!("Periodic rescan");
                    ChangeEvent::Ready
                }
            };

            self.process(event).await;
        }
    }

    async fn process(&self, event: ChangeEvent) {
        let mutator = self.mutator.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || mutator.apply(&event)).await {
            tracing::error!(error = %e, "Index update task failed");
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
