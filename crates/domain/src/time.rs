//! Timestamps stamped on entity snapshots and state changes.

use chrono::{DateTime, Utc};

/// UTC instant, used for `Entity::last_updated` and `StateChange::timestamp`.
pub type Timestamp = DateTime<Utc>;

#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
