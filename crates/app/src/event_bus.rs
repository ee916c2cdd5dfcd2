//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use plughub_domain::error::HubError;
use plughub_domain::event::StateChange;
use plughub_domain::id::EntityId;

use crate::ports::{ChangeListener, EventNotifier, EventPublisher, Subscription};

/// In-process state-change bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active listeners
/// (the change is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<StateChange>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every change on this bus.
    ///
    /// Returns a receiver that will get all changes published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, change: StateChange) -> impl Future<Output = Result<(), HubError>> + Send {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(change);
        async { Ok(()) }
    }
}

impl EventNotifier for InProcessEventBus {
    /// Spawns a dispatch task on the current tokio runtime; the listener is
    /// called from that task for each change of a watched entity.
    ///
    /// When the task falls behind and changes are dropped, the listener gets
    /// a [`StateChange::missed`] for every watched entity instead.
    fn on_change(&self, entity_ids: Vec<EntityId>, listener: ChangeListener) -> Subscription {
        let mut stream = BroadcastStream::new(self.sender.subscribe());
        let handle = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(change) if entity_ids.contains(&change.entity_id) => listener(&change),
                    Ok(_) => {}
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "state change listener lagged behind, resyncing");
                        for entity_id in &entity_ids {
                            listener(&StateChange::missed(entity_id.clone()));
                        }
                    }
                }
            }
        });
        Subscription::new(move || handle.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use plughub_domain::entity::SwitchState;

    fn id(raw: &str) -> EntityId {
        raw.parse().unwrap()
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn should_deliver_change_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        let change = StateChange::new(id("switch.fan1"), Some(SwitchState::Off), SwitchState::On);
        let change_id = change.id;

        bus.publish(change).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, change_id);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let change = StateChange::new(id("switch.fan1"), None, SwitchState::On);
        assert!(bus.publish(change).await.is_ok());
    }

    #[tokio::test]
    async fn should_call_listener_only_for_watched_entities() {
        let bus = InProcessEventBus::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = bus.on_change(
            vec![id("switch.fan1")],
            Box::new(move |change: &StateChange| {
                sink.lock().unwrap().push(change.entity_id.clone());
            }),
        );

        bus.publish(StateChange::new(id("switch.other"), None, SwitchState::On))
            .await
            .unwrap();
        bus.publish(StateChange::new(id("switch.fan1"), None, SwitchState::On))
            .await
            .unwrap();
        settle().await;

        assert_eq!(*seen.lock().unwrap(), vec![id("switch.fan1")]);
    }

    #[tokio::test]
    async fn should_resync_watched_entities_after_lagging() {
        let bus = InProcessEventBus::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = bus.on_change(
            vec![id("switch.fan1"), id("switch.osc1")],
            Box::new(move |change: &StateChange| {
                sink.lock().unwrap().push(change.clone());
            }),
        );

        for state in [SwitchState::On, SwitchState::Off, SwitchState::On] {
            bus.publish(StateChange::new(id("switch.fan1"), None, state))
                .await
                .unwrap();
        }
        settle().await;

        let seen = seen.lock().unwrap();
        let ids: Vec<_> = seen.iter().map(|change| change.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["switch.fan1", "switch.osc1", "switch.fan1"]);
        assert_eq!(seen[0].new_state, SwitchState::Unknown);
        assert_eq!(seen[1].old_state, None);
        assert_eq!(seen[2].new_state, SwitchState::On);
    }

    #[tokio::test]
    async fn should_stop_calling_listener_after_subscription_dropped() {
        let bus = InProcessEventBus::new(16);
        let seen = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&seen);

        let sub = bus.on_change(
            vec![id("switch.fan1")],
            Box::new(move |_: &StateChange| *sink.lock().unwrap() += 1),
        );
        drop(sub);
        settle().await;

        bus.publish(StateChange::new(id("switch.fan1"), None, SwitchState::On))
            .await
            .unwrap();
        settle().await;

        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
