//! Refresh watcher — re-reads an entity whenever a tracked switch changes.
//!
//! Bridges the synchronous [`EventNotifier`] callback to an async refresh:
//! the listener only forwards the changed id over a channel, and a spawned
//! task awaits the refresh for each one, in order.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use plughub_domain::event::StateChange;
use plughub_domain::id::EntityId;

use crate::ports::{EventNotifier, Subscription};

/// Owns a notifier subscription and the task that services it.
///
/// Stopping (or dropping) the watcher unregisters the listener and aborts
/// the task.
#[derive(Debug)]
pub struct RefreshWatcher {
    subscription: Option<Subscription>,
    task: Option<JoinHandle<()>>,
}

impl RefreshWatcher {
    /// Register for changes of `entity_ids` and call `refresh` for each
    /// transition. Reports that repeat the current state are skipped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(notifier: &impl EventNotifier, entity_ids: Vec<EntityId>, refresh: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<EntityId>();
        let subscription = notifier.on_change(
            entity_ids,
            Box::new(move |change: &StateChange| {
                if change.is_transition() {
                    let _ = tx.send(change.entity_id.clone());
                }
            }),
        );
        let task = tokio::spawn(async move {
            while let Some(entity_id) = rx.recv().await {
                tracing::debug!(%entity_id, "tracked switch changed, refreshing");
                refresh().await;
            }
        });

        Self {
            subscription: Some(subscription),
            task: Some(task),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Unregister the listener and abort the refresh task.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RefreshWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
