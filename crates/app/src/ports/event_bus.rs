//! Event bus port — publish side of the state-change bus.

use std::future::Future;

use plughub_domain::error::HubError;
use plughub_domain::event::StateChange;

/// Publishes state changes to interested listeners.
pub trait EventPublisher {
    /// Publish a change to all current listeners.
    fn publish(&self, change: StateChange) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, change: StateChange) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).publish(change)
    }
}
