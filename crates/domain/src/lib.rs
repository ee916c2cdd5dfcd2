//! # plughub-domain
//!
//! Pure domain model for the plughub device platforms.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (the hub's generic name/state/attributes snapshot)
//! - Define **Switch states** as reported by the host's binary switches
//! - Define the **Fan** model: speeds, directions, capability set and
//!   observed state
//! - Define **Events** (state-change records delivered by the host bus)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod entity;
pub mod event;
pub mod fan;
