//! Polling snapshot store.
//!
//! A refresh cycle fetches the queue, the barbers and the stats together and
//! publishes them as one [`Snapshot`]. A failed cycle leaves the previous
//! snapshot in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use queue_client::{QueueApi, RequestError};
use queue_types::{Barber, QueueEntry};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Snapshot;

/// Latest snapshot of server state for one page.
pub struct SnapshotStore<A: ?Sized> {
    api: Arc<A>,
    tx: watch::Sender<Arc<Snapshot>>,
    cycles: AtomicU64,
}

impl<A> SnapshotStore<A>
where
    A: QueueApi + ?Sized + 'static,
{
    /// Create an empty store; nothing is fetched until a refresh.
    pub fn new(api: Arc<A>) -> Self {
        let (tx, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            api,
            tx,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// The most recently applied snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Receiver notified every time a new snapshot is applied.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Run one refresh cycle, replacing the snapshot only on success.
    pub async fn try_refresh(&self) -> Result<Arc<Snapshot>, RequestError> {
        let (queue, barbers, stats) = tokio::try_join!(
            self.api.list_queue(),
            self.api.list_barbers(),
            self.api.queue_stats(),
        )?;
        let active = self.fetch_active(&queue, &barbers).await?;

        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot = Arc::new(Snapshot {
            cycle,
            queue,
            barbers,
            stats,
            active,
        });
        self.tx.send_replace(Arc::clone(&snapshot));

        debug!(
            cycle,
            queue = snapshot.queue.len(),
            barbers = snapshot.barbers.len(),
            "snapshot replaced"
        );
        Ok(snapshot)
    }

    /// Run one refresh cycle, logging a failure instead of returning it.
    ///
    /// Returns whether a new snapshot was applied.
    pub async fn refresh(&self) -> bool {
        match self.try_refresh().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous snapshot");
                false
            }
        }
    }

    /// Fetch the entries busy barbers are serving that the waiting list omits.
    async fn fetch_active(
        &self,
        queue: &[QueueEntry],
        barbers: &[Barber],
    ) -> Result<Vec<QueueEntry>, RequestError> {
        let missing: Vec<&str> = barbers
            .iter()
            .filter(|b| b.is_busy())
            .filter_map(|b| b.current_customer_id.as_deref())
            .filter(|id| !queue.iter().any(|e| e.id == *id))
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(missing.iter().map(|id| self.api.get_queue_entry(id))).await;

        let mut active = Vec::with_capacity(missing.len());
        for (id, result) in missing.iter().zip(results) {
            match result {
                Ok(entry) => active.push(entry),
                Err(e) if e.is_not_found() => debug!(entry = *id, "in-progress entry vanished"),
                Err(e) => return Err(e),
            }
        }
        Ok(active)
    }

    /// Refresh now and then every `interval` until the handle is stopped.
    ///
    /// Cycles never overlap: a refresh slower than `interval` delays the next
    /// tick rather than bunching missed ones, so the cadence drifts.
    pub fn activate(self: &Arc<Self>, interval: Duration) -> PollHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(?interval, "polling started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let cycle = tokio::spawn({
                            let store = Arc::clone(&store);
                            async move { store.refresh().await }
                        });
                        tokio::select! {
                            _ = token.cancelled() => {
                                // The cycle is detached and still lands when it completes
                                info!("polling stopped with a refresh in flight");
                                break;
                            }
                            _ = cycle => {}
                        }
                    }
                }
            }
        });

        PollHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Repeating refresh task bound to a page's active lifetime.
///
/// Dropping the handle cancels the task without waiting for it.
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel polling and wait for the timer task to exit.
    ///
    /// Returns without waiting for a refresh already in flight.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "polling task ended abnormally");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
