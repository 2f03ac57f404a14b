use crate::{ClusterKey, Destinations, PublishMetrics, Transport};
use smartlb_controller_core::Store;
use std::future::Future;
use tokio::time;
use tracing::{debug, error, info, warn};

/// Publishes snapshots of a [`Store`] on a fixed interval.
pub struct Publisher<T> {
    store: Store,
    endpoints: Vec<String>,
    transport: T,
    interval: time::Duration,
    metrics: PublishMetrics,
}

/// The outcome of a single publish cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cycle {
    pub delivered: usize,
    pub failed: usize,
}

// === impl Publisher ===

impl<T: Transport> Publisher<T> {
    pub fn new(
        store: Store,
        destinations: &Destinations,
        key: &ClusterKey,
        transport: T,
        interval: time::Duration,
        metrics: PublishMetrics,
    ) -> Self {
        Self {
            store,
            endpoints: destinations.endpoints(key),
            transport,
            interval,
            metrics,
        }
    }

    /// Publishes a snapshot every interval until `shutdown` completes.
    ///
    /// The first snapshot is published one interval after the task starts. Cycles never overlap:
    /// if a cycle outlasts the interval, the next tick is delayed rather than doubled up.
    pub async fn run<S: Future>(self, shutdown: S) {
        let mut ticks = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticks.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            destinations = self.endpoints.len(),
            interval = ?self.interval,
            "Publishing cluster snapshots"
        );
        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    let cycle = self.publish().await;
                    debug!(
                        delivered = cycle.delivered,
                        failed = cycle.failed,
                        "Publish cycle complete"
                    );
                }
                _ = &mut shutdown => {
                    debug!("Shutdown signaled");
                    return;
                }
            }
        }
    }

    /// Publishes the current snapshot to every destination.
    ///
    /// The store is only locked while it is copied; network I/O happens on the copy.
    pub async fn publish(&self) -> Cycle {
        let snapshot = self.store.snapshot();
        self.metrics.snapshot(&snapshot);

        let body = match serde_json::to_vec(&snapshot) {
            Ok(body) => body,
            Err(error) => {
                error!(%error, "Failed to serialize cluster snapshot");
                self.metrics.serialize_failed();
                return Cycle::default();
            }
        };

        let mut cycle = Cycle::default();
        for url in self.endpoints.iter() {
            match self.transport.post_json(url, body.clone()).await {
                Ok(status) => {
                    debug!(%url, %status, "Published cluster snapshot");
                    self.metrics.delivered(url);
                    cycle.delivered += 1;
                }
                Err(error) => {
                    warn!(%url, %error, "Failed to publish cluster snapshot");
                    self.metrics.failed(url);
                    cycle.failed += 1;
                }
            }
        }
        cycle
    }
}
