//! Typed identifiers.
//!
//! Host-addressable things (entities, scripts) are named by a
//! `<domain>.<object_id>` slug. Events carry a random UUID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

macro_rules! define_slug_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Build an identifier from its two halves.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError`] if either half is empty or contains
            /// characters other than lowercase ASCII letters, digits and `_`.
            pub fn from_parts(domain: &str, object_id: &str) -> Result<Self, ValidationError> {
                format!("{domain}.{object_id}").parse()
            }

            /// The part before the dot (e.g. `switch`).
            #[must_use]
            pub fn domain(&self) -> &str {
                self.0.split_once('.').map_or("", |(domain, _)| domain)
            }

            /// The part after the dot (e.g. `fan1`).
            #[must_use]
            pub fn object_id(&self) -> &str {
                self.0.split_once('.').map_or("", |(_, object_id)| object_id)
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_slug_id(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate_slug_id(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_slug_id!(
    /// Identifier of a hub entity, e.g. `switch.fan1` or `fan.bedroom`.
    EntityId
);

define_slug_id!(
    /// Identifier of a host script, e.g. `script.fan_set_speed`.
    ScriptId
);

define_id!(
    /// Unique identifier for a [`StateChange`](crate::event::StateChange).
    EventId
);

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

fn validate_slug_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyEntityId);
    }
    let Some((domain, object_id)) = value.split_once('.') else {
        return Err(ValidationError::InvalidId {
            value: value.to_string(),
            reason: "expected <domain>.<object_id>",
        });
    };
    if domain.is_empty() || object_id.is_empty() {
        return Err(ValidationError::InvalidId {
            value: value.to_string(),
            reason: "domain and object id must not be empty",
        });
    }
    if !domain.chars().all(is_slug_char) || !object_id.chars().all(is_slug_char) {
        return Err(ValidationError::InvalidId {
            value: value.to_string(),
            reason: "only lowercase letters, digits and underscores are allowed",
        });
    }
    Ok(())
}

/// Turn a display name into an object id (`"Bedroom Fan!"` → `bedroom_fan`).
///
/// Returns an empty string when the name has no alphanumeric characters.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}
