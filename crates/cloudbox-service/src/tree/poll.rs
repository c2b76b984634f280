//! Periodic background refresh of the tree cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::store::TreeStore;

/// Keeps a polling task alive for as long as the view that started it.
///
/// Dropping or cancelling the handle unmounts the view: a poll already in
/// flight still completes, but its results are discarded.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop polling and wait for the task to wind down.
    pub async fn join(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl TreeStore {
    /// Refresh the root listings and every expanded folder every `interval`,
    /// starting immediately.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> PollHandle {
        self.watch_with(interval, |_| {})
    }

    /// [`TreeStore::watch`], calling `after_refresh` each time a poll's
    /// results were applied to the cache.
    pub fn watch_with<F>(self: &Arc<Self>, interval: Duration, after_refresh: F) -> PollHandle
    where
        F: Fn(&TreeStore) + Send + Sync + 'static,
    {
        let token = CancellationToken::new();
        let live = token.clone();
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = live.cancelled() => break,
                    _ = ticker.tick() => {
                        match store.refresh_all(&live).await {
                            Ok(0) => {}
                            Ok(refreshed) => {
                                debug!(refreshed, "Tree poll complete");
                                after_refresh(&store);
                            }
                            Err(e) => warn!(error = %e, "Tree poll failed"),
                        }
                    }
                }
            }
            debug!("Tree poller stopped");
        });

        PollHandle {
            token,
            task: Some(task),
        }
    }
}
