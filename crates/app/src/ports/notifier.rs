//! Event notifier port — subscribe to state changes of specific entities.

use plughub_domain::event::StateChange;
use plughub_domain::id::EntityId;

/// Callback invoked for every change of a watched entity.
pub type ChangeListener = Box<dyn Fn(&StateChange) + Send + Sync>;

/// Lets a platform register for out-of-band state changes.
///
/// The returned [`Subscription`] scopes the registration: dropping it
/// unregisters the listener.
pub trait EventNotifier: Send + Sync {
    fn on_change(&self, entity_ids: Vec<EntityId>, listener: ChangeListener) -> Subscription;
}

impl<T: EventNotifier> EventNotifier for std::sync::Arc<T> {
    fn on_change(&self, entity_ids: Vec<EntityId>, listener: ChangeListener) -> Subscription {
        (**self).on_change(entity_ids, listener)
    }
}

/// Handle to a listener registration. Unregisters on drop.
#[must_use = "dropping a subscription unregisters the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap the notifier-specific teardown.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unregister now rather than on drop.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn should_cancel_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_cancel_only_once_when_cancelled_explicitly() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_report_active_subscription_in_debug_output() {
        let sub = Subscription::new(|| {});
        assert_eq!(format!("{sub:?}"), "Subscription { active: true }");
    }
}
